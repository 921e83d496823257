//! Remote completion clients.
//!
//! The orchestrator only sees the [`CompletionClient`] trait; the one
//! concrete adapter speaks the OpenAI chat-completions wire format,
//! which also covers Azure-style gateways, Ollama, vLLM, and any other
//! endpoint following that contract.

pub mod openai_compat;
pub mod traits;
pub mod util;

pub use openai_compat::OpenAiCompatClient;
pub use traits::{Completion, CompletionClient};
