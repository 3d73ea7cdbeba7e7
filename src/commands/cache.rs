use serde::Serialize;

use crate::cli::CacheCommand;
use crate::context::AppContext;
use crate::error::AppResult;

#[derive(Debug, Serialize)]
struct CacheCleared<'a> {
    profile: &'a str,
    cleared: bool,
}

pub async fn run(ctx: &AppContext, command: CacheCommand) -> AppResult<()> {
    match command {
        CacheCommand::Clear => {
            ctx.inbox_sync().reset().await?;
            let text = format!("{}: cleared cached messages and notified flags", ctx.profile);
            ctx.output.emit(
                &text,
                &CacheCleared {
                    profile: &ctx.profile,
                    cleared: true,
                },
            )
        }
    }
}
