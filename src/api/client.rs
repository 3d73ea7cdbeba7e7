use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, AppResult};

use super::messages;
use super::models::{LabelChange, LabelMutationResult, MessageSummary};

const GMAIL_API_BASE_URL: &str = "https://gmail.googleapis.com";

#[derive(Debug, Clone)]
pub struct GmailClient {
    http: Client,
    base_url: String,
}

impl GmailClient {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            base_url: GMAIL_API_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn list_unread_ids(
        &self,
        access_token: &str,
        max_results: u32,
        since_days: u32,
    ) -> AppResult<Vec<String>> {
        let query = messages::unread_query(max_results, since_days);
        let resource: GmailMessageListResource = self
            .get_json(messages::list_endpoint(), access_token, Some(&query))
            .await?;

        Ok(resource
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(|entry| entry.id)
            .collect())
    }

    pub async fn get_summary(&self, id: &str, access_token: &str) -> AppResult<MessageSummary> {
        let endpoint = messages::message_endpoint(id);
        let query = messages::detail_query();
        let resource: GmailMessageResource =
            self.get_json(&endpoint, access_token, Some(&query)).await?;
        Ok(resource.into_summary())
    }

    pub async fn modify_labels(
        &self,
        id: &str,
        change: &LabelChange,
        access_token: &str,
    ) -> AppResult<LabelMutationResult> {
        let endpoint = messages::modify_endpoint(id);
        let body = GmailModifyLabelsRequest {
            add_label_ids: &change.add,
            remove_label_ids: &change.remove,
        };

        let _: GmailModifyLabelsResponse = self.post_json(&endpoint, access_token, &body).await?;
        Ok(LabelMutationResult {
            id: id.to_string(),
            added: change.add.clone(),
            removed: change.remove.clone(),
            note: "message labels updated".to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        access_token: &str,
        query: Option<&[(String, String)]>,
    ) -> AppResult<T> {
        let url = self.endpoint_url(endpoint)?;
        let mut request = self.http.get(url).bearer_auth(access_token);
        if let Some(query) = query {
            request = request.query(query);
        }

        let response = request.send().await?;
        parse_json_response(response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        access_token: &str,
        body: &B,
    ) -> AppResult<T> {
        let url = self.endpoint_url(endpoint)?;
        let response = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .json(body)
            .send()
            .await?;

        parse_json_response(response).await
    }

    fn endpoint_url(&self, endpoint: &str) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url)?;
        url.set_path(endpoint.trim_start_matches('/'));
        Ok(url)
    }
}

async fn parse_json_response<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await.unwrap_or_default();
    Err(map_api_error(status, &body))
}

#[derive(Debug, Deserialize)]
struct GmailMessageResource {
    id: String,
    snippet: Option<String>,
    payload: Option<GmailMessagePayload>,
}

impl GmailMessageResource {
    fn into_summary(self) -> MessageSummary {
        let headers = self
            .payload
            .and_then(|payload| payload.headers)
            .unwrap_or_default();

        MessageSummary {
            id: self.id,
            subject: header_value(&headers, "Subject").unwrap_or_default(),
            from: header_value(&headers, "From").unwrap_or_default(),
            snippet: self
                .snippet
                .map(|snippet| html_escape::decode_html_entities(&snippet).into_owned())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GmailMessagePayload {
    headers: Option<Vec<GmailMessageHeader>>,
}

#[derive(Debug, Deserialize)]
struct GmailMessageHeader {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct GmailMessageListResource {
    messages: Option<Vec<GmailMessageListEntry>>,
}

#[derive(Debug, Deserialize)]
struct GmailMessageListEntry {
    id: String,
}

#[derive(Debug, Serialize)]
struct GmailModifyLabelsRequest<'a> {
    #[serde(rename = "addLabelIds")]
    add_label_ids: &'a [String],
    #[serde(rename = "removeLabelIds")]
    remove_label_ids: &'a [String],
}

#[derive(Debug, Deserialize)]
struct GmailModifyLabelsResponse {}

#[derive(Debug, Deserialize)]
struct GmailApiErrorEnvelope {
    error: GmailApiError,
}

#[derive(Debug, Deserialize)]
struct GmailApiError {
    code: Option<u16>,
    status: Option<String>,
    message: Option<String>,
    errors: Option<Vec<GmailApiErrorDetail>>,
}

#[derive(Debug, Deserialize)]
struct GmailApiErrorDetail {
    reason: Option<String>,
}

fn header_value(headers: &[GmailMessageHeader], target: &str) -> Option<String> {
    headers
        .iter()
        .find(|header| header.name.eq_ignore_ascii_case(target))
        .map(|header| header.value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn map_api_error(status: StatusCode, body: &str) -> AppError {
    let message = describe_api_error(body).unwrap_or_else(|| {
        let body = body.trim();
        if body.is_empty() {
            "no error details in response body".to_string()
        } else {
            body.to_string()
        }
    });

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return AppError::Auth(format!(
            "gmail api authorization failed ({status}): {message}. run `email-radar auth login`"
        ));
    }

    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return AppError::Unavailable(format!("gmail api ({status}): {message}"));
    }

    AppError::Api(format!("gmail api request failed ({status}): {message}"))
}

fn describe_api_error(body: &str) -> Option<String> {
    let error = serde_json::from_str::<GmailApiErrorEnvelope>(body).ok()?.error;
    let mut parts = Vec::new();

    if let Some(message) = error.message {
        parts.push(message);
    }
    if let Some(status) = error.status {
        parts.push(format!("status={status}"));
    }
    if let Some(code) = error.code {
        parts.push(format!("code={code}"));
    }
    if let Some(reason) = error
        .errors
        .and_then(|errors| errors.into_iter().find_map(|detail| detail.reason))
    {
        parts.push(format!("reason={reason}"));
    }

    if parts.is_empty() {
        return None;
    }

    Some(parts.join(", "))
}
