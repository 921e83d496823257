//! Final aggregation request.
//!
//! When a run was split across batches, each batch produced an
//! intermediate report. The merge request is the aggregation
//! instruction followed by one system message per report. Merged
//! reports can overflow the ceiling even though every originating
//! batch fit, so the request is counted and bounds-checked before it
//! is ever sent — never truncated.

use dmf_domain::counter::TokenCounter;
use dmf_domain::{Error, Message, Result};

/// Model output of one batch, kept until the aggregation stage
/// consumes it.
#[derive(Debug, Clone)]
pub struct Report {
    /// 1-based index of the originating batch.
    pub index: usize,
    pub content: String,
}

/// Build the merge request: the aggregation instruction, then one
/// system message per report in batch order.
pub fn build_merge_request(instruction: &Message, reports: &[Report]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(reports.len() + 1);
    messages.push(instruction.clone());
    for report in reports {
        messages.push(Message::system(format!(
            "report number {}: {}",
            report.index, report.content
        )));
    }
    messages
}

/// Count the merge request and reject it when it exceeds the ceiling.
/// Returns the counted size on success.
pub fn check_merge_request(
    request: &[Message],
    ceiling: u32,
    counter: &dyn TokenCounter,
) -> Result<u32> {
    let tokens = counter.count(request)?;
    if tokens > ceiling {
        return Err(Error::OversizedAggregation { tokens, ceiling });
    }
    Ok(tokens)
}
