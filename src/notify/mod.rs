pub mod desktop;

use async_trait::async_trait;

use crate::api::ClassifiedMessage;
use crate::error::AppResult;

pub use desktop::DesktopNotifier;

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, message: &ClassifiedMessage) -> AppResult<()>;
}
