use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use url::Url;

use crate::config::Settings;
use crate::error::{AppError, AppResult};

use super::callback;
use super::token::TokenSet;
use super::token_store::TokenStore;

const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_REVOKE_ENDPOINT: &str = "https://oauth2.googleapis.com/revoke";
const GOOGLE_USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(180);
// modify covers listing, reading and the read/spam label changes
const OAUTH_SCOPES: &str = "https://www.googleapis.com/auth/gmail.modify openid email";

#[derive(Debug, Serialize)]
pub struct AuthLoginResult {
    pub profile: String,
    pub opened_browser: bool,
    pub authorization_url: String,
    pub email: Option<String>,
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub profile: String,
    pub logged_in: bool,
    pub email: Option<String>,
    pub expired: Option<bool>,
    pub expires_in_seconds: Option<i64>,
    pub has_refresh_token: Option<bool>,
    pub note: Option<String>,
}

impl AuthStatus {
    fn logged_out(profile: &str, note: String) -> Self {
        Self {
            profile: profile.to_string(),
            logged_in: false,
            email: None,
            expired: None,
            expires_in_seconds: None,
            has_refresh_token: None,
            note: Some(note),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthService {
    http: Client,
}

impl AuthService {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    pub async fn login<S: TokenStore>(
        &self,
        profile: &str,
        settings: &Settings,
        store: &S,
    ) -> AppResult<AuthLoginResult> {
        let oauth = OAuthConfig::from_settings(settings)?;
        let request = AuthorizationRequest::new(&oauth)?;
        let opened_browser = open_browser(&request.url);

        if !opened_browser {
            eprintln!(
                "open this URL in your browser to grant gmail access:\n{}",
                request.url
            );
        }

        let code = callback::capture_code(&oauth.redirect_uri, &request.state, CALLBACK_TIMEOUT)
            .await?;

        let form = oauth.form([
            ("grant_type", "authorization_code".to_string()),
            ("code", code),
            ("redirect_uri", oauth.redirect_uri.clone()),
            ("code_verifier", request.code_verifier.clone()),
        ]);
        let mut token = self.exchange(form).await?;
        token.email = self.fetch_email(&token.access_token).await.unwrap_or(None);
        store.save(profile, &token)?;
        tracing::info!(profile, "stored oauth token");

        Ok(AuthLoginResult {
            profile: profile.to_string(),
            opened_browser,
            authorization_url: request.url,
            email: token.email,
            note: "oauth login completed and token stored".to_string(),
        })
    }

    pub async fn refresh<S: TokenStore>(
        &self,
        profile: &str,
        settings: &Settings,
        store: &S,
    ) -> AppResult<TokenSet> {
        let current = store.load(profile)?.ok_or_else(|| {
            AppError::Auth("not logged in. run `email-radar auth login`".to_string())
        })?;

        if !current.is_expired(SystemTime::now()) {
            return Ok(current);
        }

        let refresh_token = current.refresh_token.clone().ok_or_else(|| {
            AppError::Auth(
                "access token expired and no refresh token is stored. run `email-radar auth login`"
                    .to_string(),
            )
        })?;

        let oauth = OAuthConfig::from_settings(settings)?;
        let form = oauth.form([
            ("grant_type", "refresh_token".to_string()),
            ("refresh_token", refresh_token),
        ]);
        let mut refreshed = self.exchange(form).await?;
        refreshed.inherit_from(&current);

        store.save(profile, &refreshed)?;
        tracing::debug!(profile, "refreshed oauth access token");
        Ok(refreshed)
    }

    pub fn status<S: TokenStore>(profile: &str, store: &S) -> AppResult<AuthStatus> {
        let Some(token) = store.load(profile)? else {
            return Ok(AuthStatus::logged_out(profile, "no token found".to_string()));
        };

        let now = SystemTime::now();
        Ok(AuthStatus {
            profile: profile.to_string(),
            logged_in: true,
            email: token.email.clone(),
            expired: Some(token.is_expired(now)),
            expires_in_seconds: token.expires_in_seconds(now),
            has_refresh_token: Some(token.has_refresh_token()),
            note: Some("token loaded from local store".to_string()),
        })
    }

    pub async fn logout<S: TokenStore>(&self, profile: &str, store: &S) -> AppResult<AuthStatus> {
        let note = match store.load(profile)? {
            Some(token) => {
                let revocable = token
                    .refresh_token
                    .as_deref()
                    .unwrap_or(token.access_token.as_str());

                match self.revoke(revocable).await {
                    Ok(()) => "remote token revoked and local credentials removed".to_string(),
                    Err(err) => {
                        tracing::warn!(error = %err, "token revoke failed");
                        format!("local credentials removed (revoke failed: {err})")
                    }
                }
            }
            None => "local credentials removed".to_string(),
        };

        store.clear(profile)?;
        Ok(AuthStatus::logged_out(profile, note))
    }

    async fn exchange(&self, form: HashMap<&'static str, String>) -> AppResult<TokenSet> {
        let response = self
            .http
            .post(GOOGLE_TOKEN_ENDPOINT)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let payload: OAuthTokenResponse = response.json().await?;
            return Ok(payload.into_token_set(SystemTime::now()));
        }

        let body = response.text().await.unwrap_or_default();
        Err(token_exchange_error(status, &body))
    }

    async fn fetch_email(&self, access_token: &str) -> AppResult<Option<String>> {
        let response = self
            .http
            .get(GOOGLE_USERINFO_ENDPOINT)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let payload: UserInfoResponse = response.json().await?;
        Ok(payload.email)
    }

    async fn revoke(&self, token: &str) -> AppResult<()> {
        let response = self
            .http
            .post(GOOGLE_REVOKE_ENDPOINT)
            .form(&[("token", token)])
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(AppError::Auth(format!(
            "revoke endpoint returned {}",
            response.status()
        )))
    }
}

#[derive(Debug)]
struct OAuthConfig {
    client_id: String,
    client_secret: Option<String>,
    redirect_uri: String,
}

impl OAuthConfig {
    fn from_settings(settings: &Settings) -> AppResult<Self> {
        Ok(Self {
            client_id: settings.client_id()?.to_string(),
            client_secret: settings.client_secret().map(ToOwned::to_owned),
            redirect_uri: settings.redirect_uri(),
        })
    }

    fn form<const N: usize>(
        &self,
        fields: [(&'static str, String); N],
    ) -> HashMap<&'static str, String> {
        let mut form = HashMap::from(fields);
        form.insert("client_id", self.client_id.clone());
        if let Some(secret) = &self.client_secret {
            form.insert("client_secret", secret.clone());
        }
        form
    }
}

#[derive(Debug)]
struct AuthorizationRequest {
    url: String,
    code_verifier: String,
    state: String,
}

impl AuthorizationRequest {
    fn new(config: &OAuthConfig) -> AppResult<Self> {
        let state = random_token(32);
        let code_verifier = random_token(96);

        let mut url = Url::parse(GOOGLE_AUTH_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &config.client_id)
            .append_pair("redirect_uri", &config.redirect_uri)
            .append_pair("scope", OAUTH_SCOPES)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("state", &state)
            .append_pair("code_challenge", &pkce_challenge(&code_verifier))
            .append_pair("code_challenge_method", "S256");

        Ok(Self {
            url: url.to_string(),
            code_verifier,
            state,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    token_type: Option<String>,
    scope: Option<String>,
}

impl OAuthTokenResponse {
    fn into_token_set(self, now: SystemTime) -> TokenSet {
        let expires_at_unix = self.expires_in.and_then(|expires_in| {
            let now = now.duration_since(UNIX_EPOCH).ok()?.as_secs();
            Some(now.saturating_add(expires_in))
        });

        TokenSet {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at_unix,
            token_type: self.token_type,
            scope: self.scope,
            email: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    email: Option<String>,
}

fn token_exchange_error(status: reqwest::StatusCode, body: &str) -> AppError {
    match serde_json::from_str::<OAuthErrorResponse>(body) {
        Ok(payload) => {
            let error = payload
                .error
                .unwrap_or_else(|| "unknown_oauth_error".to_string());
            let description = payload
                .error_description
                .unwrap_or_else(|| "no description".to_string());
            AppError::Auth(format!(
                "oauth token exchange failed ({status}): {error} ({description})"
            ))
        }
        Err(_) => AppError::Auth(format!("oauth token exchange failed ({status}): {body}")),
    }
}

fn random_token(len: usize) -> String {
    let mut bytes = vec![0_u8; len];
    rand::thread_rng().fill(bytes.as_mut_slice());
    URL_SAFE_NO_PAD.encode(bytes)
}

fn pkce_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

fn open_browser(url: &str) -> bool {
    let mut command = if cfg!(target_os = "macos") {
        std::process::Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut command = std::process::Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        std::process::Command::new("xdg-open")
    };

    command
        .arg(url)
        .status()
        .is_ok_and(|status| status.success())
}
