//! Configuration management for the relay handlers
//!
//! `Config` is built once at startup, either from the process environment
//! (the Lambda deployment path) or from a TOML file (local runs), and is then
//! passed explicitly into each handler.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable naming the Secrets Manager secret
pub const ENV_SECRET_NAME: &str = "OPENAI_SECRET_NAME";
/// Environment variable overriding the model identifier
pub const ENV_MODEL: &str = "OPENAI_MODEL";
/// Environment variable overriding the sampling temperature
pub const ENV_TEMPERATURE: &str = "OPENAI_TEMP";
/// Environment variable overriding the max output tokens
pub const ENV_MAX_TOKENS: &str = "OPENAI_MAX_TOKENS";
/// Environment variable overriding the completion API base URL
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
/// Environment variable overriding the upstream request timeout
pub const ENV_TIMEOUT_SECONDS: &str = "OPENAI_TIMEOUT_SECONDS";
/// Environment variable for the default log level
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

const MAX_TIMEOUT_SECONDS: u64 = 300;

/// Recognised configuration options for the chat relay
///
/// Every field has a default, so an empty environment or an empty TOML file
/// produces a usable configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Secrets Manager secret id holding the API key payload
    secret_name: String,
    /// Model identifier sent to the completion API
    model: String,
    /// Sampling temperature, within [0.0, 2.0]
    temperature: f32,
    /// Maximum output tokens, greater than zero
    max_tokens: u32,
    /// Completion API base URL (without the `/chat/completions` suffix)
    base_url: String,
    /// Upstream request timeout in seconds, within (0, 300]
    timeout_seconds: u64,
    log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret_name: "OPENAI_API_KEY_SECRET".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 2048,
            base_url: "https://api.openai.com/v1".to_string(),
            timeout_seconds: 30,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// Empty values are treated as unset. An unparseable or out-of-range
    /// temperature or max tokens value is logged and replaced by the default.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get(ENV_SECRET_NAME) {
            config.secret_name = value;
        }
        if let Some(value) = get(ENV_MODEL) {
            config.model = value;
        }
        if let Some(value) = get(ENV_TEMPERATURE) {
            config.temperature = parse_or_default(
                ENV_TEMPERATURE,
                &value,
                config.temperature,
                |temperature: &f32| temperature.is_finite() && (0.0..=2.0).contains(temperature),
            );
        }
        if let Some(value) = get(ENV_MAX_TOKENS) {
            config.max_tokens =
                parse_or_default(ENV_MAX_TOKENS, &value, config.max_tokens, |tokens: &u32| {
                    *tokens > 0
                });
        }
        if let Some(value) = get(ENV_BASE_URL) {
            config.base_url = value;
        }
        if let Some(value) = get(ENV_TIMEOUT_SECONDS) {
            config.timeout_seconds = parse_var(ENV_TIMEOUT_SECONDS, &value)?;
        }
        config.log_level = log_level_from_lookup(&lookup);

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        let config: Self =
            toml::from_str(&content).map_err(|source| AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            })?;

        config
            .check()
            .map_err(|reason| AppError::Config(format!("{} is invalid: {}", path_display, reason)))?;

        Ok(config)
    }

    /// Validate value ranges
    ///
    /// Called by both loaders; can also be called on a hand-built `Config`.
    pub fn validate(&self) -> AppResult<()> {
        self.check().map_err(AppError::Config)
    }

    fn check(&self) -> Result<(), String> {
        if self.secret_name.trim().is_empty() {
            return Err("secret name cannot be empty".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("model cannot be empty".to_string());
        }
        if !self.temperature.is_finite() || !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }
        if self.max_tokens == 0 {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            ));
        }
        if self.timeout_seconds == 0 || self.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(format!(
                "timeout_seconds must be in (0, {}], got {}",
                MAX_TIMEOUT_SECONDS, self.timeout_seconds
            ));
        }
        Ok(())
    }

    /// Override the completion API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn secret_name(&self) -> &str {
        &self.secret_name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Completion API base URL with any trailing slash removed
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

impl FromStr for Config {
    type Err = AppError;

    /// Parse configuration from TOML text
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: Self = toml::from_str(s).map_err(|source| AppError::ConfigParseFailed {
            path: "<string>".to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// Resolve the log level from the process environment
pub fn log_level_from_env() -> String {
    log_level_from_lookup(|key| std::env::var(key).ok())
}

/// Resolve the log level from `LOG_LEVEL`, treating an empty value as unset
pub fn log_level_from_lookup<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(ENV_LOG_LEVEL)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| Config::default().log_level)
}

/// Parse `value`, keeping `default` when it does not parse or fails `accept`
fn parse_or_default<T, A>(key: &str, value: &str, default: T, accept: A) -> T
where
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
    A: Fn(&T) -> bool,
{
    match value.trim().parse::<T>() {
        Ok(parsed) if accept(&parsed) => parsed,
        Ok(parsed) => {
            tracing::warn!(
                variable = key,
                value = %parsed,
                default = %default,
                "Value out of range, using default"
            );
            default
        }
        Err(e) => {
            tracing::warn!(
                variable = key,
                value = value,
                default = %default,
                error = %e,
                "Unparseable value, using default"
            );
            default
        }
    }
}

fn parse_var<T>(key: &str, value: &str) -> AppResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| {
        AppError::Config(format!("{} has invalid value '{}': {}", key, value, e))
    })
}
