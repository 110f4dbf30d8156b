//! amplify-relay - serverless chat relay and greeting handlers
//!
//! This library provides the two AWS Lambda handlers behind the site's
//! AppSync API: a greeting function and a chat relay that forwards
//! conversations to the OpenAI chat completions API using a key held in
//! AWS Secrets Manager.

pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod handlers;
pub mod secrets;
pub mod telemetry;
