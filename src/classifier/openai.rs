use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

use super::prompt;
use super::{ClassifierClient, ClassifyItem, Verdicts};

const TEMPERATURE: f32 = 0.2;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatErrorEnvelope {
    error: ChatErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ChatErrorDetail {
    message: String,
    code: Option<String>,
}

pub struct OpenAiClassifier {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl OpenAiClassifier {
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model: model.into(),
        }
    }

    fn api_key(&self) -> AppResult<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                AppError::MissingCredential(
                    "no OpenAI API key set. run `email-radar settings set --openai-key <key>`"
                        .to_string(),
                )
            })
    }

    fn build_request(&self, batch: &[ClassifyItem]) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt::build_prompt(batch),
            }],
            temperature: TEMPERATURE,
        }
    }
}

#[async_trait]
impl ClassifierClient for OpenAiClassifier {
    fn check_credentials(&self) -> AppResult<()> {
        self.api_key().map(|_| ())
    }

    async fn classify(&self, batch: &[ClassifyItem]) -> AppResult<Verdicts> {
        if batch.is_empty() {
            return Ok(Verdicts::new());
        }

        let key = self.api_key()?;
        let url = format!("{}/chat/completions", self.base_url);
        tracing::debug!(model = %self.model, size = batch.len(), "classifying batch");

        let response = self
            .http
            .post(&url)
            .bearer_auth(key)
            .json(&self.build_request(batch))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_classifier_error(status, &body));
        }

        let payload: ChatResponse = response
            .json()
            .await
            .map_err(|err| AppError::ClassifierParse(format!("unexpected response body: {err}")))?;

        match first_content(payload) {
            Some(content) => prompt::parse_verdicts(&content),
            None => {
                tracing::warn!("classifier returned no content; treating batch as unimportant");
                Ok(Verdicts::new())
            }
        }
    }
}

fn first_content(payload: ChatResponse) -> Option<String> {
    payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
}

fn map_classifier_error(status: StatusCode, body: &str) -> AppError {
    let detail = serde_json::from_str::<ChatErrorEnvelope>(body).ok();
    let message = detail
        .as_ref()
        .map(|envelope| envelope.error.message.clone())
        .unwrap_or_else(|| format!("HTTP {status}"));

    let invalid_key = detail
        .as_ref()
        .and_then(|envelope| envelope.error.code.as_deref())
        == Some("invalid_api_key");

    if status == StatusCode::UNAUTHORIZED || invalid_key {
        return AppError::Auth(format!("classifier rejected the api key: {message}"));
    }

    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return AppError::Unavailable(format!("classifier ({status}): {message}"));
    }

    AppError::Api(format!("classifier request failed ({status}): {message}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier(key: Option<&str>) -> OpenAiClassifier {
        OpenAiClassifier::new(
            Client::new(),
            "https://api.openai.com/v1/",
            key.map(ToOwned::to_owned),
            "gpt-3.5-turbo",
        )
    }

    #[test]
    fn missing_key_is_a_missing_credential() {
        assert!(matches!(
            classifier(None).check_credentials(),
            Err(AppError::MissingCredential(_))
        ));
        assert!(matches!(
            classifier(Some(" ")).check_credentials(),
            Err(AppError::MissingCredential(_))
        ));
        assert!(classifier(Some("sk-live")).check_credentials().is_ok());
    }

    #[test]
    fn trims_trailing_slash_from_base_url() {
        assert_eq!(classifier(None).base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn request_carries_prompt_and_low_temperature() {
        let batch = [ClassifyItem {
            id: "m1".to_string(),
            subject: "Offer letter".to_string(),
            from: "hr@example.com".to_string(),
            snippet: None,
        }];

        let value = serde_json::to_value(classifier(None).build_request(&batch)).expect("json");
        assert_eq!(value["model"], "gpt-3.5-turbo");
        assert_eq!(value["messages"][0]["role"], "user");
        assert!(
            value["messages"][0]["content"]
                .as_str()
                .is_some_and(|content| content.contains("m1) Subject: Offer letter"))
        );
        assert!((value["temperature"].as_f64().unwrap_or_default() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn response_without_choices_has_no_content() {
        let payload: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).expect("parse");
        assert_eq!(first_content(payload), None);
    }

    #[test]
    fn invalid_key_maps_to_auth_error() {
        let error = map_classifier_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Incorrect API key provided","code":"invalid_api_key"}}"#,
        );
        assert!(matches!(error, AppError::Auth(_)));
    }

    #[test]
    fn server_errors_are_transient() {
        let error = map_classifier_error(StatusCode::BAD_GATEWAY, "");
        assert!(error.is_transient());
    }

    #[tokio::test]
    async fn empty_batch_skips_the_request() {
        let verdicts = classifier(None).classify(&[]).await.expect("no call needed");
        assert!(verdicts.is_empty());
    }
}
