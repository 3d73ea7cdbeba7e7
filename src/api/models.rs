use serde::{Deserialize, Serialize};

pub const LABEL_UNREAD: &str = "UNREAD";
pub const LABEL_INBOX: &str = "INBOX";
pub const LABEL_SPAM: &str = "SPAM";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSummary {
    pub id: String,
    pub subject: String,
    pub from: String,
    #[serde(default)]
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedMessage {
    pub id: String,
    pub subject: String,
    pub from: String,
    #[serde(default)]
    pub snippet: String,
    pub important: bool,
    #[serde(default)]
    pub reason: String,
}

impl ClassifiedMessage {
    pub fn new(summary: MessageSummary, important: bool, reason: String) -> Self {
        Self {
            id: summary.id,
            subject: summary.subject,
            from: summary.from,
            snippet: summary.snippet,
            important,
            reason,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelChange {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

impl LabelChange {
    pub fn mark_read() -> Self {
        Self {
            add: Vec::new(),
            remove: vec![LABEL_UNREAD.to_string()],
        }
    }

    pub fn mark_spam() -> Self {
        Self {
            add: vec![LABEL_SPAM.to_string()],
            remove: vec![LABEL_INBOX.to_string()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelMutationResult {
    pub id: String,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub note: String,
}
