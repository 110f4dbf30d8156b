//! Chat relay Lambda function
//!
//! Reads configuration from the environment once at cold start, then serves
//! AppSync chat events until the runtime shuts the sandbox down.

use amplify_relay::config::{self, Config};
use amplify_relay::handlers::{ChatEvent, ChatRelay, ChatResponse};
use amplify_relay::secrets::AwsSecretStore;
use amplify_relay::telemetry;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use std::sync::Arc;
use tracing::Instrument;

async fn function_handler(
    relay: &ChatRelay,
    event: LambdaEvent<ChatEvent>,
) -> Result<ChatResponse, Error> {
    let (payload, context) = event.into_parts();
    let span = tracing::info_span!("invocation", request_id = %context.request_id);

    let response = relay.handle(payload).instrument(span).await?;
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init(&config::log_level_from_env());
    let config = Config::from_env()?;

    tracing::info!(
        model = %config.model(),
        secret_name = %config.secret_name(),
        max_tokens = config.max_tokens(),
        "Starting chat relay function"
    );

    let secrets = Arc::new(AwsSecretStore::from_env().await);
    let relay = ChatRelay::new(config, secrets);
    let relay = &relay;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<ChatEvent>| async move {
        function_handler(relay, event).await
    }))
    .await
}
