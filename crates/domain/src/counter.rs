//! Token counting seam.
//!
//! Counting is treated as a blocking external collaborator that may
//! fail; everything that needs a count takes `&dyn TokenCounter` so
//! tests can substitute a fixed-cost implementation.

use crate::error::Result;
use crate::message::Message;

/// Counts the token size of a serialized message sequence.
///
/// Implementations must be deterministic: the same message set always
/// yields the same count, which is what makes batch planning a pure
/// function of its inputs.
pub trait TokenCounter: Send + Sync {
    /// Count the tokens of `messages` in their serialized form.
    fn count(&self, messages: &[Message]) -> Result<u32>;

    /// Count a single message in isolation.
    fn count_one(&self, message: &Message) -> Result<u32> {
        self.count(std::slice::from_ref(message))
    }
}

/// Character-based token estimator.
///
/// Uses the approximation tokens ≈ chars / 4 with a safety margin and a
/// fixed per-message overhead for role metadata. Conservative on
/// purpose: overestimating splits a request early, underestimating gets
/// it rejected by the API.
#[derive(Debug, Clone)]
pub struct HeuristicCounter {
    chars_per_token: f64,
    safety_margin: f64,
    per_message_overhead: u32,
}

impl HeuristicCounter {
    pub fn new(chars_per_token: f64, safety_margin: f64, per_message_overhead: u32) -> Self {
        Self {
            chars_per_token,
            safety_margin,
            per_message_overhead,
        }
    }
}

impl Default for HeuristicCounter {
    fn default() -> Self {
        Self::new(4.0, 1.1, 4)
    }
}

impl TokenCounter for HeuristicCounter {
    fn count(&self, messages: &[Message]) -> Result<u32> {
        let mut total: u32 = 0;
        for msg in messages {
            let chars = msg.content.chars().count() as f64;
            let tokens = (chars / self.chars_per_token * self.safety_margin).ceil() as u32;
            total = total
                .saturating_add(tokens)
                .saturating_add(self.per_message_overhead);
        }
        Ok(total)
    }
}
