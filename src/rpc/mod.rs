use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::api::ClassifiedMessage;
use crate::error::AppError;
use crate::sync::InboxSync;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    #[serde(rename = "GET_GMAIL")]
    GetGmail {
        #[serde(default)]
        count: Option<u32>,
    },
    #[serde(rename = "MARK_READ")]
    MarkRead { id: String },
    #[serde(rename = "MARK_SPAM")]
    MarkSpam { id: String },
    #[serde(rename = "SET_ICON_IMPORTANCE", rename_all = "camelCase")]
    SetIconImportance { has_important: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Emails {
        success: bool,
        emails: Vec<ClassifiedMessage>,
    },
    Failure {
        success: bool,
        error: String,
    },
    Ack {
        ok: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

impl Response {
    pub fn emails(emails: Vec<ClassifiedMessage>) -> Self {
        Response::Emails {
            success: true,
            emails,
        }
    }

    pub fn failure(error: impl ToString) -> Self {
        Response::Failure {
            success: false,
            error: error.to_string(),
        }
    }

    pub fn ack(result: Result<(), AppError>) -> Self {
        match result {
            Ok(()) => Response::Ack {
                ok: true,
                error: None,
            },
            Err(err) => Response::Ack {
                ok: false,
                error: Some(err.to_string()),
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct IconState {
    has_important: AtomicBool,
}

impl IconState {
    pub fn set(&self, has_important: bool) {
        let previous = self.has_important.swap(has_important, Ordering::SeqCst);
        if previous != has_important {
            tracing::info!(has_important, "icon importance changed");
        }
    }

    pub fn has_important(&self) -> bool {
        self.has_important.load(Ordering::SeqCst)
    }
}

pub struct RpcHandler {
    sync: Arc<InboxSync>,
    default_count: u32,
    icon: IconState,
}

impl RpcHandler {
    pub fn new(sync: Arc<InboxSync>, default_count: u32) -> Self {
        Self {
            sync,
            default_count,
            icon: IconState::default(),
        }
    }

    pub fn icon(&self) -> &IconState {
        &self.icon
    }

    // None for requests that carry no response
    pub async fn handle(&self, request: Request) -> Option<Response> {
        match request {
            Request::GetGmail { count } => {
                let count = count.unwrap_or(self.default_count);
                Some(match self.sync.refresh(count).await {
                    Ok(emails) => Response::emails(emails),
                    Err(err) => {
                        tracing::warn!(error = %err, "refresh request failed");
                        Response::failure(err)
                    }
                })
            }
            Request::MarkRead { id } => Some(Response::ack(self.sync.mark_read(&id).await)),
            Request::MarkSpam { id } => Some(Response::ack(self.sync.mark_spam(&id).await)),
            Request::SetIconImportance { has_important } => {
                self.icon.set(has_important);
                None
            }
        }
    }

    /// Parses and handles one request line.
    pub async fn handle_line(&self, line: &str) -> Option<Response> {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request).await,
            Err(err) => Some(Response::failure(format!("malformed request: {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_request_type() {
        let get: Request = serde_json::from_str(r#"{"type":"GET_GMAIL","count":20}"#).expect("get");
        assert_eq!(get, Request::GetGmail { count: Some(20) });

        let read: Request = serde_json::from_str(r#"{"type":"MARK_READ","id":"m1"}"#).expect("read");
        assert_eq!(
            read,
            Request::MarkRead {
                id: "m1".to_string()
            }
        );

        let icon: Request =
            serde_json::from_str(r#"{"type":"SET_ICON_IMPORTANCE","hasImportant":true}"#)
                .expect("icon");
        assert_eq!(
            icon,
            Request::SetIconImportance {
                has_important: true
            }
        );
    }

    #[test]
    fn count_is_optional() {
        let get: Request = serde_json::from_str(r#"{"type":"GET_GMAIL"}"#).expect("get");
        assert_eq!(get, Request::GetGmail { count: None });
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(serde_json::from_str::<Request>(r#"{"type":"NEW_EMAIL"}"#).is_err());
    }

    #[test]
    fn responses_match_wire_shapes() {
        let ok = serde_json::to_value(Response::emails(Vec::new())).expect("json");
        assert_eq!(ok, serde_json::json!({"success": true, "emails": []}));

        let failed = serde_json::to_value(Response::failure("boom")).expect("json");
        assert_eq!(failed, serde_json::json!({"success": false, "error": "boom"}));

        let ack = serde_json::to_value(Response::ack(Ok(()))).expect("json");
        assert_eq!(ack, serde_json::json!({"ok": true}));
    }

    #[test]
    fn icon_state_tracks_last_value() {
        let icon = IconState::default();
        assert!(!icon.has_important());
        icon.set(true);
        assert!(icon.has_important());
    }
}
