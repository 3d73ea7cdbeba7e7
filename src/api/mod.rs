pub mod client;
pub mod mailbox;
pub mod messages;
pub mod models;

pub use client::GmailClient;
pub use mailbox::{GmailMailbox, MailClient};
pub use models::{ClassifiedMessage, LabelChange, LabelMutationResult, MessageSummary};
