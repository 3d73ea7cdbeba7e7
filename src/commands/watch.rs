use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use crate::cli::WatchArgs;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};

pub async fn run(ctx: &AppContext, args: WatchArgs) -> AppResult<()> {
    if args.interval_secs == 0 {
        return Err(AppError::InvalidInput(
            "--interval-secs must be greater than 0".to_string(),
        ));
    }

    let count = args.count.unwrap_or_else(|| ctx.default_count());
    let sync = ctx.inbox_sync();
    let mut ticker = time::interval(Duration::from_secs(args.interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(interval_secs = args.interval_secs, count, "watching inbox");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match sync.refresh(count).await {
                    Ok(emails) => {
                        let important = emails.iter().filter(|email| email.important).count();
                        tracing::info!(cached = emails.len(), important, "refresh complete");
                    }
                    // a missing key will not fix itself between ticks
                    Err(err @ AppError::MissingCredential(_)) => return Err(err),
                    Err(err) => tracing::warn!(error = %err, "refresh failed, will retry next tick"),
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                tracing::info!("interrupted, stopping watch");
                return Ok(());
            }
        }
    }
}
