//! Lambda request handlers
//!
//! Each handler is a plain async (or sync) function over typed event and
//! response structs; the binaries in `src/bin` adapt them to `lambda_runtime`.

pub mod chat;
pub mod greeting;

pub use chat::{ChatEvent, ChatRelay, ChatResponse};
pub use greeting::{GreetingEvent, GreetingResponse, greet};
