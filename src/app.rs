use crate::cli::{Cli, Command};
use crate::commands;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::logging;

pub async fn run(cli: Cli) -> AppResult<()> {
    let Cli {
        profile,
        json,
        verbose,
        command,
    } = cli;

    logging::init(verbose);
    let ctx = AppContext::bootstrap(profile, json)?;

    match command {
        Command::Auth(args) => commands::auth::run(&ctx, args.command).await,
        Command::Inbox(args) => commands::inbox::run(&ctx, args).await,
        Command::Mark(args) => commands::mark::run(&ctx, args.command).await,
        Command::Watch(args) => commands::watch::run(&ctx, args).await,
        Command::Serve(args) => commands::serve::run(&ctx, args).await,
        Command::Settings(args) => commands::settings::run(&ctx, args.command),
        Command::Cache(args) => commands::cache::run(&ctx, args.command).await,
    }
}
