use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::cli::ServeArgs;
use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::output::json;
use crate::rpc::RpcHandler;
use crate::sync::InboxSync;

pub async fn run(ctx: &AppContext, args: ServeArgs) -> AppResult<()> {
    if args.poll_secs == Some(0) {
        return Err(AppError::InvalidInput(
            "--poll-secs must be greater than 0".to_string(),
        ));
    }

    let sync = Arc::new(ctx.inbox_sync());
    let handler = RpcHandler::new(Arc::clone(&sync), ctx.default_count());
    let poller = args
        .poll_secs
        .map(|secs| spawn_poller(Arc::clone(&sync), ctx.default_count(), secs));

    tracing::info!(profile = %ctx.profile, poll_secs = ?args.poll_secs, "serving requests on stdin");

    let stdin = BufReader::new(tokio::io::stdin());
    let served = serve_lines(&handler, stdin, &mut io::stdout()).await;

    if let Some(poller) = poller {
        poller.abort();
    }
    served
}

pub async fn serve_lines<R, W>(handler: &RpcHandler, input: R, output: &mut W) -> AppResult<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(response) = handler.handle_line(line).await {
            json::write_line(output, &response)?;
        }
    }

    tracing::debug!("input closed");
    Ok(())
}

fn spawn_poller(sync: Arc<InboxSync>, count: u32, secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(Duration::from_secs(secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match sync.refresh(count).await {
                Ok(emails) => tracing::debug!(cached = emails.len(), "background refresh complete"),
                Err(err) => tracing::warn!(error = %err, "background refresh failed"),
            }
        }
    })
}
