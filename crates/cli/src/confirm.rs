//! Interactive yes/no confirmation.
//!
//! The orchestrator only sees the [`Confirm`] trait so tests can
//! script answers without a TTY.

use dmf_domain::Result;

/// A yes/no prompt. Declining is a normal outcome, not an error.
pub trait Confirm {
    /// Show `prompt` and return whether the user agreed.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Whether a typed answer counts as affirmative: empty input defaults
/// to yes, otherwise only a case-insensitive "yes" proceeds.
pub fn is_affirmative(answer: &str) -> bool {
    let trimmed = answer.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("yes")
}

/// Readline-backed confirmation for interactive runs.
pub struct ReadlineConfirm {
    editor: rustyline::DefaultEditor,
}

impl ReadlineConfirm {
    pub fn new() -> Result<Self> {
        let editor = rustyline::DefaultEditor::new()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        Ok(Self { editor })
    }
}

impl Confirm for ReadlineConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        eprintln!("{prompt}");
        match self.editor.readline("[yes] > ") {
            Ok(line) => Ok(is_affirmative(&line)),
            // Ctrl+C / Ctrl+D decline instead of failing.
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => Ok(false),
            Err(e) => Err(dmf_domain::Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                e.to_string(),
            ))),
        }
    }
}
