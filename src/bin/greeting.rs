//! Greeting Lambda function

use amplify_relay::config;
use amplify_relay::handlers::{GreetingEvent, GreetingResponse, greet};
use amplify_relay::telemetry;
use lambda_runtime::{Error, LambdaEvent, service_fn};

async fn function_handler(event: LambdaEvent<GreetingEvent>) -> Result<GreetingResponse, Error> {
    tracing::debug!(request_id = %event.context.request_id, "Received greeting event");
    Ok(greet(&event.payload))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init(&config::log_level_from_env());

    lambda_runtime::run(service_fn(function_handler)).await
}
