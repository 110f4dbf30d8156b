//! Command-line interface for invoking the handlers locally
//!
//! `relay-cli` runs the same handler code the Lambda binaries run, reading an
//! event from a file or stdin and printing the JSON response.

use crate::config::Config;
use crate::error::{AppError, AppResult};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::io::Read;

/// Invoke the chat relay and greeting handlers outside Lambda
#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(version)]
#[command(about = "Invoke the chat relay and greeting handlers locally")]
#[command(
    long_about = "Runs the Lambda handlers against a JSON event read from a file or stdin. \
    The chat relay uses the ambient AWS credentials to read its API key from Secrets Manager."
)]
pub struct Cli {
    /// Path to a TOML configuration file (defaults to the environment)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the chat relay handler
    Chat {
        /// Event JSON file, or "-" for stdin
        #[arg(short, long, default_value = "-")]
        event: String,
    },
    /// Run the greeting handler
    Greet {
        /// Name to greet (builds the event directly)
        #[arg(short, long, conflicts_with = "event")]
        name: Option<String>,

        /// Event JSON file, or "-" for stdin
        #[arg(short, long)]
        event: Option<String>,
    },
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

impl Cli {
    /// Load configuration from `--config` if given, otherwise the environment
    pub fn load_config(&self) -> AppResult<Config> {
        match &self.config {
            Some(path) => Config::from_file(path),
            None => Config::from_env(),
        }
    }
}

/// Read raw event JSON from `source`, where `-` means stdin
pub fn read_event(source: &str) -> AppResult<String> {
    if source == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(std::fs::read_to_string(source)?)
    }
}

/// Parse raw event JSON into a handler event
pub fn parse_event<T: DeserializeOwned>(raw: &str) -> AppResult<T> {
    serde_json::from_str(raw).map_err(AppError::InvalidEvent)
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# amplify-relay configuration
#
# Every option is optional. Deployed functions read the same options from
# environment variables (shown next to each key).

# Secrets Manager secret id holding {"OPENAI_API_KEY": "..."}   (OPENAI_SECRET_NAME)
secret_name = "OPENAI_API_KEY_SECRET"

# Model identifier                                   (OPENAI_MODEL)
model = "gpt-4o-mini"

# Sampling temperature, 0.0-2.0                      (OPENAI_TEMP)
temperature = 0.2

# Maximum output tokens                              (OPENAI_MAX_TOKENS)
max_tokens = 2048

# Chat completions API base URL                      (OPENAI_BASE_URL)
base_url = "https://api.openai.com/v1"

# Upstream request timeout in seconds, 1-300         (OPENAI_TIMEOUT_SECONDS)
timeout_seconds = 30

# Log level when RUST_LOG is unset                   (LOG_LEVEL)
log_level = "info"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn chat_reads_stdin_by_default() {
        let cli = Cli::parse_from(["relay-cli", "chat"]);
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Command::Chat { ref event } if event == "-"));
    }

    #[test]
    fn global_config_path() {
        let cli = Cli::parse_from(["relay-cli", "chat", "--config", "local.toml", "-e", "ev.json"]);
        assert_eq!(cli.config.as_deref(), Some("local.toml"));
        assert!(matches!(cli.command, Command::Chat { ref event } if event == "ev.json"));
    }

    #[test]
    fn parse_event_accepts_chat_event() {
        let event: crate::handlers::ChatEvent =
            parse_event(r#"{"arguments":{"initializeSession":true}}"#).expect("valid event");
        assert!(event.arguments.initialize_session);
    }

    #[test]
    fn parse_event_rejects_malformed_json() {
        let result: AppResult<crate::handlers::GreetingEvent> = parse_event("{not json");
        let err = result.unwrap_err();
        assert!(matches!(err, AppError::InvalidEvent(_)));
        assert!(err.to_string().starts_with("Invalid event payload"), "got: {}", err);
    }

    #[test]
    fn greet_with_name() {
        let cli = Cli::parse_from(["relay-cli", "greet", "--name", "Ada"]);
        assert!(matches!(
            cli.command,
            Command::Greet { name: Some(ref n), event: None } if n == "Ada"
        ));
    }

    #[test]
    fn greet_name_conflicts_with_event() {
        let result = Cli::try_parse_from(["relay-cli", "greet", "-n", "Ada", "-e", "ev.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn config_subcommand_with_output() {
        let cli = Cli::parse_from(["relay-cli", "config", "-o", "relay.toml"]);
        assert!(matches!(
            cli.command,
            Command::Config { output: Some(ref path) } if path == "relay.toml"
        ));
    }

    #[test]
    fn template_parses_to_default_config() {
        let config: Config = generate_config_template()
            .parse()
            .expect("template should be a valid config");
        assert_eq!(config, Config::default());
    }
}
