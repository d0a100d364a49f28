//! Terminal output helpers and the publish confirmation gate.

use console::style;
use dialoguer::Confirm;

use crate::error::ReleaseError;

/// Print a passed check, indented under a stage heading.
pub fn pass(message: &str) {
    println!("  {} {}", style("[PASS]").green(), message);
}

/// Print a completed action.
pub fn done(message: &str) {
    println!("  {} {}", style("[DONE]").green(), message);
}

/// Print a skipped action.
pub fn skip(message: &str) {
    println!("  {} {}", style("[SKIP]").dim(), message);
}

/// Print a non-fatal warning.
pub fn warn(message: &str) {
    println!("  {} {}", style("[WARN]").yellow(), message);
}

/// Print a failed action to stderr.
pub fn fail(message: &str) {
    eprintln!("  {} {}", style("[FAIL]").red(), message);
}

/// Print a fatal error to stderr.
pub fn error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Trait for the upload confirmation gate.
///
/// This abstraction allows scripting the operator's answer in tests.
#[cfg_attr(test, mockall::automock)]
pub trait PublishGate {
    /// Ask the operator whether to upload.
    ///
    /// Errors when no answer could be read, for example when stdin is
    /// not a terminal. Callers must treat that as a rejection.
    fn confirm_upload(&self, prompt: &str) -> Result<bool, ReleaseError>;
}

/// Gate that prompts on the operator's terminal. Defaults to no.
pub struct TerminalGate;

impl PublishGate for TerminalGate {
    fn confirm_upload(&self, prompt: &str) -> Result<bool, ReleaseError> {
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| ReleaseError::PromptFailed(e.to_string()))
    }
}
