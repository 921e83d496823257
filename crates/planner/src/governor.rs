//! Throughput pacing between batch submissions.
//!
//! The governor only decides; the orchestrator performs the actual
//! suspension with a cooperative async sleep, so a pause never blocks
//! cancellation or unrelated work.

use std::time::Duration;

use dmf_domain::config::TokenBudget;

/// Decides when the submission loop must pause to stay inside the
/// per-minute token allowance.
#[derive(Debug, Clone, Copy)]
pub struct ThroughputGovernor {
    requests_per_minute: u32,
    /// Set when the whole plan exceeds the per-minute allowance; short
    /// plans are never paced.
    long_run: bool,
}

impl ThroughputGovernor {
    /// How long the loop sleeps when a pause is due.
    pub const PAUSE_INTERVAL: Duration = Duration::from_secs(60);

    pub fn new(budget: TokenBudget, long_run: bool) -> Self {
        Self {
            requests_per_minute: Self::requests_per_minute(budget),
            long_run,
        }
    }

    /// Number of ceiling-sized requests that fit in one minute of
    /// allowance, rounded up.
    pub fn requests_per_minute(budget: TokenBudget) -> u32 {
        budget.per_minute_allowance.div_ceil(budget.max_per_request)
    }

    /// Whether to pause after sending batch `index` (1-based) out of
    /// `total_batches`. Pauses land on every `requests_per_minute`-th
    /// batch of a long run, and never after the last batch.
    pub fn should_pause(&self, index: u32, total_batches: u32) -> bool {
        self.long_run
            && index < total_batches
            && index % self.requests_per_minute == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(max: u32, allowance: u32) -> TokenBudget {
        TokenBudget {
            max_per_request: max,
            per_minute_allowance: allowance,
        }
    }

    #[test]
    fn requests_per_minute_rounds_up() {
        assert_eq!(
            ThroughputGovernor::requests_per_minute(budget(15_000, 58_500)),
            4
        );
        assert_eq!(
            ThroughputGovernor::requests_per_minute(budget(10_000, 40_000)),
            4
        );
        assert_eq!(
            ThroughputGovernor::requests_per_minute(budget(10_000, 40_001)),
            5
        );
    }

    #[test]
    fn pauses_every_nth_batch_on_long_runs() {
        // rpm = 2: pause after batches 2 and 4, not 1/3/5.
        let gov = ThroughputGovernor::new(budget(10_000, 20_000), true);
        let pauses: Vec<bool> = (1..=5).map(|i| gov.should_pause(i, 5)).collect();
        assert_eq!(pauses, vec![false, true, false, true, false]);
    }

    #[test]
    fn never_pauses_after_the_last_batch() {
        let gov = ThroughputGovernor::new(budget(10_000, 20_000), true);
        assert!(!gov.should_pause(4, 4));
        assert!(gov.should_pause(4, 5));
    }

    #[test]
    fn short_runs_are_never_paced() {
        let gov = ThroughputGovernor::new(budget(10_000, 20_000), false);
        assert!((1..=8).all(|i| !gov.should_pause(i, 9)));
    }
}
