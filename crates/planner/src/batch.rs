//! Token-bounded batch planning.
//!
//! Packs an ordered sequence of file messages into request batches
//! whose counted size never exceeds the ceiling. Each batch starts
//! with the same leading instruction message (when one is given), and
//! a batch is flushed *before* appending the message that would
//! overflow it, so no closed batch ever exceeds the ceiling.

use dmf_domain::counter::TokenCounter;
use dmf_domain::{Message, Result};

/// One request's worth of messages with its running token size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub messages: Vec<Message>,
    pub tokens: u32,
}

/// Outcome of a planning run. Immutable after construction.
#[derive(Debug, Clone)]
pub struct PlanResult {
    /// Batches in submission order.
    pub batches: Vec<Batch>,
    /// Input messages placed into batches (the leading instruction is
    /// never counted here), so `total_messages + ignored` always equals
    /// the input length.
    pub total_messages: usize,
    /// Input messages rejected because they individually exceed the
    /// ceiling.
    pub ignored: usize,
}

/// Packs messages into ceiling-bounded batches using an injected
/// counter. Pure: identical inputs and counter yield byte-identical
/// plans.
pub struct BatchPlanner<'a> {
    counter: &'a dyn TokenCounter,
}

impl<'a> BatchPlanner<'a> {
    pub fn new(counter: &'a dyn TokenCounter) -> Self {
        Self { counter }
    }

    /// Plan `messages` into batches of at most `ceiling` counted
    /// tokens, each seeded with `leading` when provided.
    ///
    /// Messages are counted one by one in isolation, never by
    /// subtracting from a cumulative count, so a message costs the
    /// same in whichever batch it lands. A message whose isolated
    /// count exceeds the ceiling is ignored outright. The final batch
    /// is closed unconditionally: zero input messages still yield one
    /// (leading-only, possibly empty) batch so a short project still
    /// produces a valid request.
    pub fn plan(
        &self,
        messages: &[Message],
        ceiling: u32,
        leading: Option<&Message>,
    ) -> Result<PlanResult> {
        let lead_cost = match leading {
            Some(msg) => self.counter.count_one(msg)?,
            None => 0,
        };
        let seed = |batch: &mut Vec<Message>| {
            if let Some(msg) = leading {
                batch.push(msg.clone());
            }
        };

        let mut batches: Vec<Batch> = Vec::new();
        let mut current: Vec<Message> = Vec::new();
        seed(&mut current);
        let mut current_tokens = lead_cost;
        let mut placed_in_current: usize = 0;
        let mut total_messages: usize = 0;
        let mut ignored: usize = 0;

        for message in messages {
            let size = self.counter.count_one(message)?;

            if size > ceiling {
                tracing::warn!(tokens = size, ceiling, "message too big, ignoring it");
                ignored += 1;
                continue;
            }

            if current_tokens + size > ceiling {
                tracing::debug!(
                    batch = batches.len() + 1,
                    messages = placed_in_current,
                    tokens = current_tokens,
                    "batch closed"
                );
                total_messages += placed_in_current;
                batches.push(Batch {
                    messages: std::mem::take(&mut current),
                    tokens: current_tokens,
                });
                seed(&mut current);
                current_tokens = lead_cost;
                placed_in_current = 0;
            }

            current.push(message.clone());
            current_tokens += size;
            placed_in_current += 1;
        }

        // The last batch always closes, even when nothing beyond the
        // leading message made it in.
        total_messages += placed_in_current;
        batches.push(Batch {
            messages: current,
            tokens: current_tokens,
        });

        Ok(PlanResult {
            batches,
            total_messages,
            ignored,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmf_domain::counter::TokenCounter;

    /// Counter whose cost is encoded in the message content itself
    /// (`"<n>"` costs n tokens), keeping scenarios exact.
    struct EncodedCost;

    impl TokenCounter for EncodedCost {
        fn count(&self, messages: &[Message]) -> Result<u32> {
            Ok(messages
                .iter()
                .map(|m| m.content.parse::<u32>().unwrap_or(0))
                .sum())
        }
    }

    fn msg(cost: u32) -> Message {
        Message::user(cost.to_string())
    }

    #[test]
    fn three_small_messages_fit_one_batch() {
        // Scenario A: three files well under the ceiling.
        let planner = BatchPlanner::new(&EncodedCost);
        let input = vec![msg(100), msg(200), msg(300)];
        let plan = planner.plan(&input, 10_000, None).unwrap();

        assert_eq!(plan.batches.len(), 1);
        assert_eq!(plan.ignored, 0);
        assert_eq!(plan.total_messages, 3);
        assert_eq!(plan.batches[0].tokens, 600);
    }

    #[test]
    fn oversized_message_is_ignored() {
        // Scenario B: a single file counting above the ceiling joins
        // no batch at all.
        let planner = BatchPlanner::new(&EncodedCost);
        let input = vec![msg(20_000)];
        let plan = planner.plan(&input, 10_000, None).unwrap();

        assert_eq!(plan.ignored, 1);
        assert_eq!(plan.total_messages, 0);
        assert_eq!(plan.batches.len(), 1);
        assert!(plan.batches[0].messages.is_empty());
    }

    #[test]
    fn flush_happens_before_overflowing_append() {
        // Scenario C: lead=500, messages of 4000 each, ceiling 10000.
        // 500+4000+4000 = 8500 fits; the third 4000 would hit 12500,
        // so the batch closes first.
        let planner = BatchPlanner::new(&EncodedCost);
        let lead = Message::system("500");
        let input = vec![msg(4_000), msg(4_000), msg(4_000)];
        let plan = planner.plan(&input, 10_000, Some(&lead)).unwrap();

        assert_eq!(plan.batches.len(), 2);
        assert_eq!(plan.batches[0].tokens, 8_500);
        assert_eq!(plan.batches[0].messages.len(), 3); // lead + m1 + m2
        assert_eq!(plan.batches[1].tokens, 4_500);
        assert_eq!(plan.batches[1].messages.len(), 2); // lead + m3
        assert_eq!(plan.batches[1].messages[0], lead);
        assert_eq!(plan.total_messages, 3);
    }

    #[test]
    fn every_closed_batch_respects_the_ceiling() {
        let planner = BatchPlanner::new(&EncodedCost);
        let lead = Message::system("300");
        let input: Vec<Message> = [900, 2_500, 4_000, 100, 3_900, 12_000, 4_000, 50]
            .iter()
            .map(|c| msg(*c))
            .collect();
        let plan = planner.plan(&input, 5_000, Some(&lead)).unwrap();

        for batch in &plan.batches {
            assert!(batch.tokens <= 5_000, "batch of {} tokens", batch.tokens);
        }
        assert_eq!(plan.ignored, 1); // the 12_000 message
        assert_eq!(plan.total_messages + plan.ignored, input.len());
    }

    #[test]
    fn conservation_holds_for_any_input() {
        let planner = BatchPlanner::new(&EncodedCost);
        let input: Vec<Message> = (0..40).map(|i| msg(i * 700 % 9_000)).collect();
        let plan = planner.plan(&input, 6_000, None).unwrap();

        let placed: usize = plan.batches.iter().map(|b| b.messages.len()).sum();
        assert_eq!(placed, plan.total_messages);
        assert_eq!(plan.total_messages + plan.ignored, input.len());
    }

    #[test]
    fn zero_messages_still_yield_one_batch() {
        let planner = BatchPlanner::new(&EncodedCost);
        let lead = Message::system("500");

        let plan = planner.plan(&[], 10_000, Some(&lead)).unwrap();
        assert_eq!(plan.batches.len(), 1);
        assert_eq!(plan.batches[0].messages, vec![lead]);
        assert_eq!(plan.batches[0].tokens, 500);

        let plan = planner.plan(&[], 10_000, None).unwrap();
        assert_eq!(plan.batches.len(), 1);
        assert!(plan.batches[0].messages.is_empty());
    }

    #[test]
    fn planning_is_deterministic() {
        let planner = BatchPlanner::new(&EncodedCost);
        let lead = Message::system("250");
        let input: Vec<Message> = (0..25).map(|i| msg(1_000 + i * 137)).collect();

        let first = planner.plan(&input, 7_500, Some(&lead)).unwrap();
        let second = planner.plan(&input, 7_500, Some(&lead)).unwrap();

        assert_eq!(first.batches, second.batches);
        assert_eq!(first.total_messages, second.total_messages);
        assert_eq!(first.ignored, second.ignored);
    }

    /// Counter that always fails, like an external token process
    /// that cannot run.
    struct BrokenCounter;

    impl TokenCounter for BrokenCounter {
        fn count(&self, _messages: &[Message]) -> Result<u32> {
            Err(dmf_domain::Error::Counting("token counter unavailable".into()))
        }
    }

    #[test]
    fn counter_failure_propagates_out_of_planning() {
        let planner = BatchPlanner::new(&BrokenCounter);
        let err = planner.plan(&[msg(100)], 10_000, None).unwrap_err();
        assert!(matches!(err, dmf_domain::Error::Counting(_)));

        // A failing leading-message count aborts before the loop too.
        let lead = Message::system("500");
        let err = planner.plan(&[], 10_000, Some(&lead)).unwrap_err();
        assert!(matches!(err, dmf_domain::Error::Counting(_)));
    }

    #[test]
    fn message_exactly_at_ceiling_is_kept() {
        let planner = BatchPlanner::new(&EncodedCost);
        let plan = planner.plan(&[msg(10_000)], 10_000, None).unwrap();
        assert_eq!(plan.ignored, 0);
        assert_eq!(plan.batches.len(), 1);
        assert_eq!(plan.batches[0].tokens, 10_000);
    }
}
