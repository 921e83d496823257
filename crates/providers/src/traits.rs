use dmf_domain::{Message, Result};

/// The model's answer to one request.
#[derive(Debug, Clone)]
pub struct Completion {
    /// Textual content of the response.
    pub content: String,
    /// Total tokens billed for the request (prompt + completion).
    pub tokens_used: u32,
}

/// The remote completion operation.
///
/// One opaque call: an ordered message sequence in, content plus token
/// usage out. Failures here are distinct from token-counting failures
/// so the orchestrator can report which collaborator broke.
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one completion request and wait for the full response.
    async fn complete(&self, messages: &[Message]) -> Result<Completion>;

    /// A unique identifier for this client instance.
    fn client_id(&self) -> &str;
}
