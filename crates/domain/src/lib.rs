//! Shared types for docmyfiles: messages, errors, configuration,
//! instruction prompts, and the token-counting seam.

pub mod config;
pub mod counter;
pub mod error;
pub mod message;
pub mod prompt;

pub use error::{Error, Result};
pub use message::{Message, Role};
