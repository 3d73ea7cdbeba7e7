use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at_unix: Option<u64>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl TokenSet {
    const EXPIRY_SKEW_SECS: u64 = 30;

    pub fn is_expired(&self, now: SystemTime) -> bool {
        let Some(expires_at) = self.expires_at_unix else {
            return false;
        };

        let Ok(duration) = now.duration_since(UNIX_EPOCH) else {
            return false;
        };

        duration.as_secs().saturating_add(Self::EXPIRY_SKEW_SECS) >= expires_at
    }

    pub fn expires_in_seconds(&self, now: SystemTime) -> Option<i64> {
        let expires_at = self.expires_at_unix? as i64;
        let now_secs = now.duration_since(UNIX_EPOCH).ok()?.as_secs() as i64;
        Some(expires_at - now_secs)
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }

    pub fn inherit_from(&mut self, previous: &TokenSet) {
        if self.refresh_token.is_none() {
            self.refresh_token = previous.refresh_token.clone();
        }
        if self.email.is_none() {
            self.email = previous.email.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn token(expires_at_unix: Option<u64>) -> TokenSet {
        TokenSet {
            access_token: "access".to_string(),
            refresh_token: None,
            expires_at_unix,
            token_type: Some("Bearer".to_string()),
            scope: None,
            email: None,
        }
    }

    #[test]
    fn token_without_expiry_never_expires() {
        assert!(!token(None).is_expired(SystemTime::now()));
    }

    #[test]
    fn token_inside_skew_window_is_expired() {
        let now = UNIX_EPOCH + Duration::from_secs(1_000);
        assert!(token(Some(1_020)).is_expired(now));
        assert!(!token(Some(1_100)).is_expired(now));
    }

    #[test]
    fn inherits_refresh_token_and_email() {
        let mut previous = token(Some(1));
        previous.refresh_token = Some("refresh".to_string());
        previous.email = Some("me@example.com".to_string());

        let mut fresh = token(Some(5_000));
        fresh.inherit_from(&previous);

        assert_eq!(fresh.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(fresh.email.as_deref(), Some("me@example.com"));
        assert!(fresh.has_refresh_token());
    }
}
