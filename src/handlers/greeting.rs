//! Greeting handler
//!
//! Returns `"Hello " + name` for an AppSync-style `{arguments: {name}}` event.

use serde::{Deserialize, Serialize};

/// Incoming greeting event
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GreetingEvent {
    #[serde(default)]
    pub arguments: GreetingArguments,
}

impl GreetingEvent {
    pub fn for_name(name: impl Into<String>) -> Self {
        Self {
            arguments: GreetingArguments { name: name.into() },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GreetingArguments {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GreetingResponse {
    pub message: String,
}

/// Build the greeting for `event`. Cannot fail; an empty name yields `"Hello "`.
pub fn greet(event: &GreetingEvent) -> GreetingResponse {
    GreetingResponse {
        message: format!("Hello {}", event.arguments.name),
    }
}
