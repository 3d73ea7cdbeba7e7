use async_trait::async_trait;

use crate::config::Settings;
use crate::error::AppResult;

use super::oauth::AuthService;
use super::token_store::TokenStore;

#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn access_token(&self) -> AppResult<String>;
}

// never starts interactive consent; a missing token is an auth error
#[derive(Debug)]
pub struct OAuthCredentials<S> {
    profile: String,
    settings: Settings,
    store: S,
    auth: AuthService,
}

impl<S: TokenStore> OAuthCredentials<S> {
    pub fn new(profile: impl Into<String>, settings: Settings, store: S, auth: AuthService) -> Self {
        Self {
            profile: profile.into(),
            settings,
            store,
            auth,
        }
    }
}

#[async_trait]
impl<S: TokenStore> CredentialProvider for OAuthCredentials<S> {
    async fn access_token(&self) -> AppResult<String> {
        let token = self
            .auth
            .refresh(&self.profile, &self.settings, &self.store)
            .await?;
        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::auth::TokenSet;
    use crate::error::AppError;

    #[derive(Default)]
    struct SingleTokenStore {
        token: Mutex<Option<TokenSet>>,
    }

    impl TokenStore for SingleTokenStore {
        fn load(&self, _profile: &str) -> AppResult<Option<TokenSet>> {
            Ok(self.token.lock().unwrap_or_else(|e| e.into_inner()).clone())
        }

        fn save(&self, _profile: &str, token: &TokenSet) -> AppResult<()> {
            *self.token.lock().unwrap_or_else(|e| e.into_inner()) = Some(token.clone());
            Ok(())
        }

        fn clear(&self, _profile: &str) -> AppResult<()> {
            *self.token.lock().unwrap_or_else(|e| e.into_inner()) = None;
            Ok(())
        }
    }

    #[tokio::test]
    async fn serves_unexpired_token_without_network() {
        let store = SingleTokenStore::default();
        store
            .save(
                "default",
                &TokenSet {
                    access_token: "live-token".to_string(),
                    refresh_token: None,
                    expires_at_unix: None,
                    token_type: None,
                    scope: None,
                    email: None,
                },
            )
            .expect("save");

        let credentials =
            OAuthCredentials::new("default", Settings::default(), store, AuthService::default());
        assert_eq!(credentials.access_token().await.expect("token"), "live-token");
    }

    #[tokio::test]
    async fn missing_token_is_an_auth_failure() {
        let credentials = OAuthCredentials::new(
            "default",
            Settings::default(),
            SingleTokenStore::default(),
            AuthService::default(),
        );

        match credentials.access_token().await {
            Err(AppError::Auth(message)) => assert!(message.contains("auth login")),
            other => panic!("expected auth error, got {other:?}"),
        }
    }
}
