use async_trait::async_trait;
use notify_rust::Notification;

use crate::api::ClassifiedMessage;
use crate::error::{AppError, AppResult};

use super::NotificationSink;

const APP_NAME: &str = "email-radar";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub body: String,
}

impl Alert {
    pub fn for_message(message: &ClassifiedMessage) -> Self {
        let subject = if message.subject.is_empty() {
            "(no subject)"
        } else {
            message.subject.as_str()
        };
        let body = if message.reason.is_empty() {
            message.from.clone()
        } else {
            message.reason.clone()
        };

        Self {
            title: format!("Important email: {subject}"),
            body,
        }
    }

    fn notification(&self) -> Notification {
        let mut notification = Notification::new();
        notification
            .summary(&self.title)
            .body(&self.body)
            .appname(APP_NAME);
        notification
    }
}

// stderr is the fallback when no notification daemon answers
#[derive(Debug, Clone, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    async fn show(&self, alert: &Alert) -> AppResult<()> {
        let notification = alert.notification();
        // the dbus/appkit call blocks
        tokio::task::spawn_blocking(move || notification.show().map(|_| ()))
            .await
            .map_err(|err| AppError::Api(format!("notifier task failed: {err}")))?
            .map_err(|err| AppError::Api(format!("desktop notification failed: {err}")))
    }
}

#[async_trait]
impl NotificationSink for DesktopNotifier {
    async fn notify(&self, message: &ClassifiedMessage) -> AppResult<()> {
        let alert = Alert::for_message(message);
        if let Err(err) = self.show(&alert).await {
            tracing::debug!(error = %err, "desktop notifier unavailable, using stderr");
            eprintln!("[{APP_NAME}] {} - {}", alert.title, alert.body);
        }
        Ok(())
    }
}
