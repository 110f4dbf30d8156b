//! Secret store access
//!
//! The chat relay resolves its API key from AWS Secrets Manager on every
//! invocation. The store sits behind the [`SecretStore`] trait so the relay can
//! be exercised against an in-memory double.

use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::Client;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use std::collections::HashMap;

/// Field inside the secret's JSON payload that holds the raw API key
pub const API_KEY_FIELD: &str = "OPENAI_API_KEY";

/// Lookup-by-name access to a secret store
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the string value of a secret
    ///
    /// Returns `Ok(None)` when the secret exists but has no string value
    /// (for example a binary-only secret).
    async fn get_secret_string(&self, secret_id: &str) -> AppResult<Option<String>>;
}

/// AWS Secrets Manager backed [`SecretStore`]
#[derive(Clone, Debug)]
pub struct AwsSecretStore {
    client: Client,
}

impl AwsSecretStore {
    /// Build a store from the default AWS credential and region chain
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::new(Client::new(&sdk_config))
    }

    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SecretStore for AwsSecretStore {
    async fn get_secret_string(&self, secret_id: &str) -> AppResult<Option<String>> {
        tracing::debug!(secret_name = %secret_id, "Fetching secret from Secrets Manager");

        let output = self
            .client
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| AppError::SecretRetrieval {
                secret_name: secret_id.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(output.secret_string().map(str::to_string))
    }
}

/// Retrieve the API key stored under [`API_KEY_FIELD`] in `secret_name`
///
/// Queries the store exactly once; failures are returned without retry.
pub async fn fetch_api_key(store: &dyn SecretStore, secret_name: &str) -> AppResult<String> {
    let secret_string = store
        .get_secret_string(secret_name)
        .await?
        .ok_or_else(|| AppError::SecretMissing {
            secret_name: secret_name.to_string(),
        })?;

    extract_api_key(secret_name, &secret_string)
}

fn extract_api_key(secret_name: &str, secret_string: &str) -> AppResult<String> {
    let mut fields: HashMap<String, String> =
        serde_json::from_str(secret_string).map_err(|source| AppError::SecretMalformed {
            secret_name: secret_name.to_string(),
            source,
        })?;

    fields
        .remove(API_KEY_FIELD)
        .ok_or_else(|| AppError::CredentialMissing {
            secret_name: secret_name.to_string(),
            field: API_KEY_FIELD.to_string(),
        })
}
