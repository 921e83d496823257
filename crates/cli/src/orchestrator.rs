//! The run state machine.
//!
//! `Planning -> AwaitingConfirmation -> {Aborted | SinglePass |
//! MultiPass}`. A project that fits under the per-request ceiling is
//! sent as one request; anything bigger is split into batches whose
//! intermediate reports are merged by a final aggregation request.
//! All remote calls are sequential suspension points; the only timed
//! wait is the governor-mandated inter-batch pause, which is a
//! cooperative `tokio::time::sleep` and never blocks cancellation.

use std::path::Path;

use dmf_domain::config::{Config, TokenBudget};
use dmf_domain::counter::TokenCounter;
use dmf_domain::prompt::{PromptKind, PromptTable};
use dmf_domain::{Message, Result};
use dmf_planner::aggregate::{build_merge_request, check_merge_request};
use dmf_planner::{BatchPlanner, Report, ThroughputGovernor};
use dmf_providers::CompletionClient;

use crate::confirm::Confirm;

/// Fixed attribution footer appended to every generated README,
/// exactly once.
pub const README_FOOTER: &str = "\n\n---\n*This README was generated by docmyfiles.*\n";

/// What a run produced, reported at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub batch_count: usize,
    pub total_messages: usize,
    pub ignored: usize,
    pub tokens_used: u32,
    pub estimated_cost: f64,
}

/// How a run ended. Declining a confirmation is a clean cancellation,
/// never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Completed(RunSummary),
    Declined,
}

/// Drives the overall flow: plan, confirm, submit batches under the
/// governor, aggregate if needed, write the README.
pub struct Orchestrator<'a> {
    config: &'a Config,
    budget: TokenBudget,
    prompts: &'a PromptTable,
    counter: &'a dyn TokenCounter,
    client: &'a dyn CompletionClient,
    confirm: &'a mut dyn Confirm,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a Config,
        budget: TokenBudget,
        prompts: &'a PromptTable,
        counter: &'a dyn TokenCounter,
        client: &'a dyn CompletionClient,
        confirm: &'a mut dyn Confirm,
    ) -> Self {
        Self {
            config,
            budget,
            prompts,
            counter,
            client,
            confirm,
        }
    }

    /// Run the full flow over the ingested file messages.
    pub async fn run(&mut self, messages: Vec<Message>) -> Result<RunOutcome> {
        // ── Planning ─────────────────────────────────────────────────
        let classic = self.prompts.get(PromptKind::Classic);
        let mut full_request = Vec::with_capacity(messages.len() + 1);
        full_request.push(classic.message.clone());
        full_request.extend(messages.iter().cloned());

        let total_tokens = self.counter.count(&full_request)?;
        let big_request = total_tokens > self.budget.max_per_request;
        let long_request = total_tokens > self.budget.per_minute_allowance;

        tracing::info!(
            total_tokens,
            files = messages.len(),
            big_request,
            long_request,
            "plan classified"
        );

        if big_request {
            self.multi_pass(&messages, total_tokens, long_request).await
        } else {
            self.single_pass(full_request, total_tokens, messages.len())
                .await
        }
    }

    // ── Single pass ──────────────────────────────────────────────────

    async fn single_pass(
        &mut self,
        request: Vec<Message>,
        total_tokens: u32,
        file_count: usize,
    ) -> Result<RunOutcome> {
        let cost = self.config.pricing.estimate(total_tokens);
        let proceed = self.confirm.confirm(&format!(
            "The whole project fits in one request of about {total_tokens} tokens \
             (estimated cost ${cost:.4}). Send it?"
        ))?;
        if !proceed {
            tracing::info!("run declined at confirmation, nothing sent");
            return Ok(RunOutcome::Declined);
        }

        let completion = self.client.complete(&request).await.map_err(|e| {
            tracing::error!(client = self.client.client_id(), error = %e, "completion request failed");
            e
        })?;
        self.write_readme(&completion.content)?;

        Ok(RunOutcome::Completed(RunSummary {
            batch_count: 1,
            total_messages: file_count,
            ignored: 0,
            tokens_used: completion.tokens_used,
            estimated_cost: self.config.pricing.estimate(completion.tokens_used),
        }))
    }

    // ── Multi pass ───────────────────────────────────────────────────

    async fn multi_pass(
        &mut self,
        messages: &[Message],
        total_tokens: u32,
        long_request: bool,
    ) -> Result<RunOutcome> {
        let cost = self.config.pricing.estimate(total_tokens);
        let proceed = self.confirm.confirm(&format!(
            "The project is too large for a single request: about {total_tokens} \
             tokens (estimated cost ${cost:.4}). It will be sent as multiple \
             batches, then merged. Continue?"
        ))?;
        if !proceed {
            tracing::info!("run declined before planning, nothing sent");
            return Ok(RunOutcome::Declined);
        }

        let big = self.prompts.get(PromptKind::Big);
        let plan = BatchPlanner::new(self.counter).plan(
            messages,
            self.budget.max_per_request,
            Some(&big.message),
        )?;

        eprintln!("Plan overview:");
        for (i, batch) in plan.batches.iter().enumerate() {
            eprintln!(
                "  batch {}: {} messages, {} tokens",
                i + 1,
                batch.messages.len(),
                batch.tokens
            );
        }
        if plan.ignored > 0 {
            eprintln!(
                "  {} file(s) exceed the {}-token ceiling on their own and will be ignored",
                plan.ignored, self.budget.max_per_request
            );
        }

        let proceed = self.confirm.confirm("Send the plan above?")?;
        if !proceed {
            tracing::info!("plan declined, nothing sent");
            return Ok(RunOutcome::Declined);
        }

        // ── Batch submission ────────────────────────────────────────
        let governor = ThroughputGovernor::new(self.budget, long_request);
        let batch_count = plan.batches.len();
        let mut reports: Vec<Report> = Vec::with_capacity(batch_count);
        let mut tokens_used: u32 = 0;

        for (i, batch) in plan.batches.iter().enumerate() {
            let index = i + 1;
            tracing::info!(batch = index, of = batch_count, tokens = batch.tokens, "sending batch");

            let completion = self.client.complete(&batch.messages).await.map_err(|e| {
                tracing::error!(
                    client = self.client.client_id(),
                    batch = index,
                    error = %e,
                    "batch submission failed"
                );
                e
            })?;
            tokens_used += completion.tokens_used;
            reports.push(Report {
                index,
                content: completion.content,
            });

            if governor.should_pause(index as u32, batch_count as u32) {
                tracing::info!(
                    secs = ThroughputGovernor::PAUSE_INTERVAL.as_secs(),
                    "per-minute allowance reached, pausing"
                );
                tokio::time::sleep(ThroughputGovernor::PAUSE_INTERVAL).await;
            }
        }

        // ── Aggregation ─────────────────────────────────────────────
        let aggregate = self.prompts.get(PromptKind::Aggregate);
        let merge_request = build_merge_request(&aggregate.message, &reports);
        let merge_tokens =
            check_merge_request(&merge_request, self.budget.max_per_request, self.counter)?;
        tracing::info!(merge_tokens, reports = reports.len(), "sending aggregation request");

        let completion = self.client.complete(&merge_request).await.map_err(|e| {
            tracing::error!(client = self.client.client_id(), error = %e, "aggregation request failed");
            e
        })?;
        tokens_used += completion.tokens_used;
        self.write_readme(&completion.content)?;

        Ok(RunOutcome::Completed(RunSummary {
            batch_count,
            total_messages: plan.total_messages,
            ignored: plan.ignored,
            tokens_used,
            estimated_cost: self.config.pricing.estimate(tokens_used),
        }))
    }

    // ── Output ───────────────────────────────────────────────────────

    fn write_readme(&self, content: &str) -> Result<()> {
        let path = Path::new(&self.config.project.root).join("README.md");
        std::fs::write(&path, format!("{content}{README_FOOTER}"))?;
        tracing::info!(path = %path.display(), "README written");
        Ok(())
    }
}
