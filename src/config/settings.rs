use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

use super::files;

const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8787/callback";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 45;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Auto,
    Light,
    Dark,
}

impl FromStr for Theme {
    type Err = AppError;

    fn from_str(raw: &str) -> AppResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Theme::Auto),
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(AppError::InvalidInput(format!(
                "unknown theme `{other}`; expected auto, light or dark"
            ))),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Theme::Auto => "auto",
            Theme::Light => "light",
            Theme::Dark => "dark",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BatchSize {
    #[default]
    Ten,
    Twenty,
    Thirty,
    Fifty,
}

impl BatchSize {
    pub fn count(self) -> u32 {
        match self {
            BatchSize::Ten => 10,
            BatchSize::Twenty => 20,
            BatchSize::Thirty => 30,
            BatchSize::Fifty => 50,
        }
    }
}

impl TryFrom<u32> for BatchSize {
    type Error = AppError;

    fn try_from(value: u32) -> AppResult<Self> {
        match value {
            10 => Ok(BatchSize::Ten),
            20 => Ok(BatchSize::Twenty),
            30 => Ok(BatchSize::Thirty),
            50 => Ok(BatchSize::Fifty),
            other => Err(AppError::InvalidInput(format!(
                "batch size {other} is not one of 10, 20, 30, 50"
            ))),
        }
    }
}

impl From<BatchSize> for u32 {
    fn from(value: BatchSize) -> Self {
        value.count()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(rename = "openaiKey", default, skip_serializing_if = "Option::is_none")]
    pub openai_key: Option<String>,
    #[serde(rename = "openaiModel", default, skip_serializing_if = "Option::is_none")]
    pub openai_model: Option<String>,
    #[serde(rename = "openaiBaseUrl", default, skip_serializing_if = "Option::is_none")]
    pub openai_base_url: Option<String>,
    #[serde(rename = "useSnippet", default)]
    pub use_snippet: bool,
    #[serde(rename = "darkMode", default)]
    pub theme: Theme,
    #[serde(default)]
    pub batch: BatchSize,
    #[serde(rename = "defaultImportantOnly", default)]
    pub default_important_only: bool,
    #[serde(rename = "requestTimeoutSecs", default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(
        rename = "classifierTimeoutSecs",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub classifier_timeout_secs: Option<u64>,
}

impl Settings {
    pub fn client_id(&self) -> AppResult<&str> {
        self.client_id.as_deref().ok_or_else(|| {
            AppError::Config(
                "missing oauth client_id in profile settings. add it to your profile json"
                    .to_string(),
            )
        })
    }

    pub fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }

    pub fn redirect_uri(&self) -> String {
        self.redirect_uri
            .clone()
            .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string())
    }

    pub fn openai_key(&self) -> Option<&str> {
        self.openai_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    pub fn openai_model(&self) -> &str {
        self.openai_model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL)
    }

    pub fn openai_base_url(&self) -> &str {
        self.openai_base_url
            .as_deref()
            .unwrap_or(DEFAULT_OPENAI_BASE_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
                .max(1),
        )
    }

    pub fn classifier_timeout(&self) -> Duration {
        Duration::from_secs(
            self.classifier_timeout_secs
                .unwrap_or(DEFAULT_CLASSIFIER_TIMEOUT_SECS)
                .max(1),
        )
    }

    pub fn masked_openai_key(&self) -> Option<String> {
        self.openai_key().map(mask_secret)
    }
}

fn mask_secret(secret: &str) -> String {
    let chars = secret.chars().collect::<Vec<_>>();
    if chars.len() <= 8 {
        return "****".to_string();
    }

    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

pub fn load(path: &Path) -> AppResult<Settings> {
    let settings = files::read_json(path).map_err(|err| match err {
        AppError::Json(err) => AppError::Config(format!(
            "invalid settings in {}: {err}",
            path.display()
        )),
        other => other,
    })?;
    Ok(settings.unwrap_or_default())
}

pub fn save(path: &Path, settings: &Settings) -> AppResult<()> {
    files::write_json_private(path, settings)
}
