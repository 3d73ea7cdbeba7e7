pub mod api;
pub mod app;
pub mod auth;
pub mod classifier;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod notify;
pub mod output;
pub mod rpc;
pub mod store;
pub mod sync;

use cli::Cli;
use error::AppResult;

pub async fn run(cli: Cli) -> AppResult<()> {
    app::run(cli).await
}
