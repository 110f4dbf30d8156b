//! OpenAI chat completions client
//!
//! Wire types follow the OpenAI Chat Completions API. Only the fields the
//! relay sends or reads are modelled; everything else in a response is ignored.

use crate::config::Config;
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Role tag for the leading system message
pub const ROLE_SYSTEM: &str = "system";
/// Role applied to caller messages that arrive without one
pub const ROLE_USER: &str = "user";

/// One role-tagged message in an outgoing conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: String,
}

impl CompletionMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ROLE_SYSTEM.to_string(),
            content: content.into(),
        }
    }
}

/// Body of `POST /chat/completions`
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<CompletionMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Successful response body
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: AssistantMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Error envelope returned with non-2xx statuses
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Chat completions client bound to one API key
///
/// Built per invocation; holds its own HTTP client.
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    /// Create a client for `base_url` (e.g. `https://api.openai.com/v1`)
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Create a client from relay configuration
    pub fn from_config(config: &Config, api_key: impl Into<String>) -> AppResult<Self> {
        Self::new(config.base_url(), api_key, config.timeout())
    }

    /// Submit a chat completion request
    ///
    /// Transport failures and non-2xx statuses map to
    /// [`AppError::CompletionFailed`]. A successful response may still carry
    /// zero choices; that check is left to the caller.
    pub async fn create_chat_completion(
        &self,
        request: &CompletionRequest,
    ) -> AppResult<CompletionResponse> {
        let url = format!("{}/chat/completions", self.base_url);
        let failed = |reason: String| AppError::CompletionFailed {
            model: request.model.clone(),
            reason,
        };

        tracing::debug!(
            url = %url,
            model = %request.model,
            message_count = request.messages.len(),
            max_tokens = request.max_tokens,
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| failed(describe_transport_error(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(failed(describe_status_error(status, &body)));
        }

        response
            .json::<CompletionResponse>()
            .await
            .map_err(|e| failed(format!("invalid response body: {}", e)))
    }
}

fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        format!("request timed out: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        format!("request failed: {}", error)
    }
}

fn describe_status_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => format!("HTTP {}: {}", status.as_u16(), envelope.error.message),
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status.as_u16()),
        Err(_) => format!("HTTP {}: {}", status.as_u16(), body.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_openai_shape() {
        let request = CompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![
                CompletionMessage::system("be brief"),
                CompletionMessage {
                    role: ROLE_USER.to_string(),
                    content: "Hi".to_string(),
                },
            ],
            temperature: 0.5,
            max_tokens: 2048,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "Hi"}
                ],
                "temperature": 0.5,
                "max_tokens": 2048
            })
        );
    }

    #[test]
    fn test_response_ignores_extra_fields_and_null_content() {
        let body = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": null}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 1, "completion_tokens": 0, "total_tokens": 1}
        }"#;

        let response: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.choices.len(), 1);
        assert!(response.choices[0].message.content.is_none());
    }

    #[test]
    fn test_response_without_choices_field_is_empty() {
        let response: CompletionResponse = serde_json::from_str(r#"{"id":"x"}"#).unwrap();
        assert!(response.choices.is_empty());
    }

    #[test]
    fn test_status_error_uses_upstream_message() {
        let reason = describe_status_error(
            reqwest::StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#,
        );
        assert_eq!(reason, "HTTP 401: Incorrect API key provided");
    }

    #[test]
    fn test_status_error_falls_back_to_raw_body() {
        assert_eq!(
            describe_status_error(reqwest::StatusCode::BAD_GATEWAY, "upstream down\n"),
            "HTTP 502: upstream down"
        );
        assert_eq!(
            describe_status_error(reqwest::StatusCode::SERVICE_UNAVAILABLE, ""),
            "HTTP 503"
        );
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client =
            OpenAiClient::new("http://localhost:1234/v1/", "sk", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url, "http://localhost:1234/v1");
    }
}
