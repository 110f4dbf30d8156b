//! relay-cli
//!
//! Runs the chat relay or greeting handler once against a local event.

use amplify_relay::cli::{Cli, Command, generate_config_template, parse_event, read_event};
use amplify_relay::handlers::{ChatEvent, ChatRelay, GreetingEvent, greet};
use amplify_relay::secrets::AwsSecretStore;
use amplify_relay::telemetry;
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Config { output } => {
            let template = generate_config_template();
            match output {
                Some(path) => {
                    std::fs::write(path, template)?;
                    eprintln!("Wrote configuration template to {}", path);
                }
                None => print!("{}", template),
            }
        }
        Command::Greet { name, event } => {
            let event = match (name, event) {
                (Some(name), _) => GreetingEvent::for_name(name),
                (None, Some(source)) => parse_event(&read_event(source)?)?,
                (None, None) => parse_event(&read_event("-")?)?,
            };
            println!("{}", serde_json::to_string_pretty(&greet(&event))?);
        }
        Command::Chat { event } => {
            let config = cli.load_config()?;
            telemetry::init(config.log_level());

            let event: ChatEvent = parse_event(&read_event(event)?)?;
            let secrets = Arc::new(AwsSecretStore::from_env().await);
            let relay = ChatRelay::new(config, secrets);

            let response = relay.handle(event).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
