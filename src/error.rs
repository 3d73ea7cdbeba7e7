use std::io;

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("auth error: {0}")]
    Auth(String),
    #[error("missing credential: {0}")]
    MissingCredential(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("service unavailable: {0}")]
    Unavailable(String),
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("classifier response could not be parsed: {0}")]
    ClassifierParse(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl AppError {
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Timeout(_) | AppError::Unavailable(_) => true,
            AppError::Http(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }
}
