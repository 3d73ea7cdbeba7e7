pub mod openai;
pub mod prompt;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::api::MessageSummary;
use crate::error::AppResult;

pub use openai::OpenAiClassifier;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifyItem {
    pub id: String,
    pub subject: String,
    pub from: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl ClassifyItem {
    pub fn from_summary(summary: &MessageSummary, include_snippet: bool) -> Self {
        let snippet = include_snippet
            .then(|| summary.snippet.trim())
            .filter(|snippet| !snippet.is_empty())
            .map(ToOwned::to_owned);

        Self {
            id: summary.id.clone(),
            subject: summary.subject.clone(),
            from: summary.from.clone(),
            snippet,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    pub important: bool,
    pub reason: String,
}

// ids may be missing
pub type Verdicts = HashMap<String, Verdict>;

#[async_trait]
pub trait ClassifierClient: Send + Sync {
    fn check_credentials(&self) -> AppResult<()>;

    async fn classify(&self, batch: &[ClassifyItem]) -> AppResult<Verdicts>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> MessageSummary {
        MessageSummary {
            id: "m1".to_string(),
            subject: "Your statement".to_string(),
            from: "bank@example.com".to_string(),
            snippet: "balance due friday".to_string(),
        }
    }

    #[test]
    fn snippet_is_withheld_unless_opted_in() {
        let item = ClassifyItem::from_summary(&summary(), false);
        assert_eq!(item.snippet, None);

        let value = serde_json::to_value(&item).expect("serialize");
        assert!(value.get("snippet").is_none());
    }

    #[test]
    fn snippet_is_shared_when_opted_in() {
        let item = ClassifyItem::from_summary(&summary(), true);
        assert_eq!(item.snippet.as_deref(), Some("balance due friday"));
    }

    #[test]
    fn blank_snippet_is_dropped() {
        let mut summary = summary();
        summary.snippet = "   ".to_string();
        assert_eq!(ClassifyItem::from_summary(&summary, true).snippet, None);
    }
}
