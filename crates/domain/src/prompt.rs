//! Instruction prompts.
//!
//! One table keyed by purpose, each entry holding the instruction
//! message (built around the configured project description) and its
//! precomputed token cost.

use crate::counter::TokenCounter;
use crate::error::Result;
use crate::message::Message;

/// Purpose of an instruction message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Single-request run: all files fit under the ceiling.
    Classic,
    /// Leading message of every batch in a multi-request run; asks the
    /// model for an intermediate report instead of a README.
    Big,
    /// Final merge request combining all reports into the README.
    Aggregate,
}

/// An instruction message with its counted token cost.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub message: Message,
    pub tokens: u32,
}

/// All three instruction prompts, costs counted once at startup.
#[derive(Debug, Clone)]
pub struct PromptTable {
    classic: Prompt,
    big: Prompt,
    aggregate: Prompt,
}

impl PromptTable {
    pub fn new(classic: Prompt, big: Prompt, aggregate: Prompt) -> Self {
        Self { classic, big, aggregate }
    }

    /// Build the table for a project description, counting each
    /// instruction with the injected counter.
    pub fn build(description: &str, counter: &dyn TokenCounter) -> Result<Self> {
        let make = |content: String| -> Result<Prompt> {
            let message = Message::system(content);
            let tokens = counter.count_one(&message)?;
            Ok(Prompt { message, tokens })
        };

        let classic = make(format!(
            "You are a useful assistant, specialized in programming, mainly used to \
             generate custom README files. Here is a short description of my project: \
             {description}. Here are my project files so that you can generate a \
             custom README for me:"
        ))?;
        let big = make(format!(
            "You are a useful assistant, specialized in programming, mainly used to \
             generate custom README files for projects. Here is a short description \
             of my project: {description}. I will send you multiple requests, each \
             with multiple files. Please generate a full report of the files so that \
             you can later generate a README from the report files."
        ))?;
        let aggregate = make(format!(
            "You are a useful assistant, specialized in programming, mainly used to \
             generate custom README files for projects. Here is a short description \
             of my project: {description}. I have sent you multiple requests, each \
             with multiple files, and you have generated a full report for each. \
             Please generate a README based on my description and your full reports."
        ))?;

        Ok(Self { classic, big, aggregate })
    }

    pub fn get(&self, kind: PromptKind) -> &Prompt {
        match kind {
            PromptKind::Classic => &self.classic,
            PromptKind::Big => &self.big,
            PromptKind::Aggregate => &self.aggregate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::HeuristicCounter;
    use crate::message::Role;

    #[test]
    fn table_embeds_description_in_every_prompt() {
        let counter = HeuristicCounter::default();
        let table = PromptTable::build("a tiny chess engine", &counter).unwrap();
        for kind in [PromptKind::Classic, PromptKind::Big, PromptKind::Aggregate] {
            let prompt = table.get(kind);
            assert_eq!(prompt.message.role, Role::System);
            assert!(prompt.message.content.contains("a tiny chess engine"));
            assert!(prompt.tokens > 0);
        }
    }

    #[test]
    fn costs_match_isolated_counts() {
        let counter = HeuristicCounter::default();
        let table = PromptTable::build("demo", &counter).unwrap();
        let classic = table.get(PromptKind::Classic);
        assert_eq!(
            classic.tokens,
            counter.count_one(&classic.message).unwrap()
        );
    }
}
