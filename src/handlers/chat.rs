//! Chat relay handler
//!
//! Forwards a caller's conversation to the completion API, prefixed with a
//! system prompt, and maps the first returned choice into a [`ChatResponse`].

use crate::completion::{CompletionMessage, CompletionRequest, OpenAiClient, ROLE_USER};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::secrets::{SecretStore, fetch_api_key};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

/// System prompt used when the caller does not supply one
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that can answer questions and help with tasks.";
/// Response message for the session-initialization path
pub const SESSION_INITIALIZED: &str = "Session initialized";
/// Response message when the request carries no messages
pub const NO_MESSAGES_FOUND: &str = "No messages found in request";

/// Incoming chat event (`{"arguments": {...}}`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChatEvent {
    #[serde(default)]
    pub arguments: ChatRequest,
}

/// Caller arguments for one conversation turn
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub initialize_session: bool,
}

impl ChatRequest {
    /// Caller-supplied system prompt if present and non-empty, else the default
    pub fn effective_system_prompt(&self) -> &str {
        match self.system_prompt.as_deref() {
            Some(prompt) if !prompt.is_empty() => prompt,
            _ => DEFAULT_SYSTEM_PROMPT,
        }
    }
}

/// One role/content pair supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Convert to the outgoing wire form, defaulting an empty role to `user`
    fn to_completion_message(&self) -> CompletionMessage {
        let role = if self.role.is_empty() {
            ROLE_USER
        } else {
            self.role.as_str()
        };
        CompletionMessage {
            role: role.to_string(),
            content: self.content.clone(),
        }
    }
}

/// A source reference attached to a response. Never populated by the relay.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Citation {
    pub title: String,
    pub uri: String,
}

/// Response envelope returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatResponse {
    pub message: String,
    pub citations: Vec<Citation>,
}

impl ChatResponse {
    /// Response carrying `message` and no citations
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            citations: Vec::new(),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Build the outgoing conversation: one system message, then the caller's
/// messages in their original order
pub fn build_conversation(system_prompt: &str, messages: &[ChatMessage]) -> Vec<CompletionMessage> {
    std::iter::once(CompletionMessage::system(system_prompt))
        .chain(messages.iter().map(ChatMessage::to_completion_message))
        .collect()
}

/// Chat relay bound to a configuration and a secret store
///
/// Holds no per-invocation state; each call to [`ChatRelay::handle`] fetches
/// the API key and builds its own completion client.
#[derive(Clone)]
pub struct ChatRelay {
    config: Config,
    secrets: Arc<dyn SecretStore>,
}

impl ChatRelay {
    pub fn new(config: Config, secrets: Arc<dyn SecretStore>) -> Self {
        Self { config, secrets }
    }

    /// Handle one chat event
    ///
    /// Session initialization and empty message lists short-circuit with a
    /// fixed response and make no external calls. Otherwise the secret lookup
    /// and the completion request run strictly in sequence, and any failure is
    /// returned as-is.
    pub async fn handle(&self, event: ChatEvent) -> AppResult<ChatResponse> {
        tracing::info!("Received event");
        let request = event.arguments;

        if request.initialize_session {
            tracing::info!("Initializing session");
            return Ok(ChatResponse::text(SESSION_INITIALIZED));
        }

        if request.messages.is_empty() {
            tracing::info!("No messages in request");
            return Ok(ChatResponse::text(NO_MESSAGES_FOUND));
        }

        let system_prompt = request.effective_system_prompt();
        let custom_system_prompt = system_prompt != DEFAULT_SYSTEM_PROMPT;
        tracing::info!(
            message_count = request.messages.len(),
            custom_system_prompt,
            "Messages received"
        );

        let api_key = fetch_api_key(self.secrets.as_ref(), self.config.secret_name()).await?;

        let completion = CompletionRequest {
            model: self.config.model().to_string(),
            messages: build_conversation(system_prompt, &request.messages),
            temperature: self.config.temperature(),
            max_tokens: self.config.max_tokens(),
        };

        let client = OpenAiClient::from_config(&self.config, api_key)?;
        let response = client.create_chat_completion(&completion).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NoChoices {
                model: completion.model.clone(),
            })?;

        let message = choice.message.content.unwrap_or_default();
        tracing::info!(bot_response_msg = %message, "Chat completion received");

        Ok(ChatResponse::text(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> ChatRequest {
        serde_json::from_str(json).expect("should deserialize chat request")
    }

    #[test]
    fn test_request_deserializes_camel_case_arguments() {
        let req = request(
            r#"{"messages":[{"role":"user","content":"Hi"}],"systemPrompt":"be terse","initializeSession":true}"#,
        );
        assert_eq!(req.messages, vec![ChatMessage::new("user", "Hi")]);
        assert_eq!(req.system_prompt.as_deref(), Some("be terse"));
        assert!(req.initialize_session);
    }

    #[test]
    fn test_request_defaults_when_fields_absent_or_null() {
        let req = request(r#"{"messages":null,"systemPrompt":null,"initializeSession":null}"#);
        assert!(req.messages.is_empty());
        assert!(req.system_prompt.is_none());
        assert!(!req.initialize_session);

        let req = request("{}");
        assert!(req.messages.is_empty());
    }

    #[test]
    fn test_message_role_optional() {
        let req = request(r#"{"messages":[{"content":"a"},{"role":null,"content":"b"}]}"#);
        assert_eq!(req.messages[0].role, "");
        assert_eq!(req.messages[1].role, "");
    }

    #[test]
    fn test_effective_system_prompt() {
        assert_eq!(request("{}").effective_system_prompt(), DEFAULT_SYSTEM_PROMPT);
        assert_eq!(
            request(r#"{"systemPrompt":""}"#).effective_system_prompt(),
            DEFAULT_SYSTEM_PROMPT
        );
        assert_eq!(
            request(r#"{"systemPrompt":"custom"}"#).effective_system_prompt(),
            "custom"
        );
    }

    #[test]
    fn test_conversation_starts_with_system_and_preserves_order() {
        let messages = vec![
            ChatMessage::new("", "first"),
            ChatMessage::new("assistant", "second"),
            ChatMessage::new("user", "third"),
        ];

        let conversation = build_conversation("sys", &messages);

        let roles: Vec<&str> = conversation.iter().map(|m| m.role.as_str()).collect();
        let contents: Vec<&str> = conversation.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(roles, ["system", "user", "assistant", "user"]);
        assert_eq!(contents, ["sys", "first", "second", "third"]);
    }

    #[test]
    fn test_response_serializes_empty_citations() {
        let json = serde_json::to_value(ChatResponse::text(SESSION_INITIALIZED)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"message": "Session initialized", "citations": []})
        );
    }
}
