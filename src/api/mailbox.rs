use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::CredentialProvider;
use crate::error::AppResult;

use super::client::GmailClient;
use super::models::{LabelChange, MessageSummary};

#[async_trait]
pub trait MailClient: Send + Sync {
    async fn list_unread(&self, max_results: u32, since_days: u32) -> AppResult<Vec<String>>;
    async fn get_detail(&self, id: &str) -> AppResult<MessageSummary>;
    async fn modify_labels(&self, id: &str, change: &LabelChange) -> AppResult<()>;
}

pub struct GmailMailbox {
    client: GmailClient,
    credentials: Arc<dyn CredentialProvider>,
}

impl GmailMailbox {
    pub fn new(client: GmailClient, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            client,
            credentials,
        }
    }
}

#[async_trait]
impl MailClient for GmailMailbox {
    async fn list_unread(&self, max_results: u32, since_days: u32) -> AppResult<Vec<String>> {
        let token = self.credentials.access_token().await?;
        self.client
            .list_unread_ids(&token, max_results, since_days)
            .await
    }

    async fn get_detail(&self, id: &str) -> AppResult<MessageSummary> {
        let token = self.credentials.access_token().await?;
        self.client.get_summary(id, &token).await
    }

    async fn modify_labels(&self, id: &str, change: &LabelChange) -> AppResult<()> {
        let token = self.credentials.access_token().await?;
        let result = self.client.modify_labels(id, change, &token).await?;
        tracing::debug!(
            id = %result.id,
            added = ?result.added,
            removed = ?result.removed,
            "{}",
            result.note
        );
        Ok(())
    }
}
