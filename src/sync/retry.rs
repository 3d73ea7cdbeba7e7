use std::future::Future;
use std::time::Duration;

use tokio::time;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    fn delay(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(retry.saturating_sub(1)))
    }
}

pub async fn with_timeout<T, F>(what: &str, limit: Duration, call: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    match time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(format!(
            "{what} gave no answer within {}ms",
            limit.as_millis()
        ))),
    }
}

// only for idempotent calls
pub async fn retry<T, F, Fut>(policy: RetryPolicy, what: &str, mut op: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < attempts => {
                let delay = policy.delay(attempt);
                tracing::warn!(
                    error = %err,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "{what} failed, retrying"
                );
                time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
