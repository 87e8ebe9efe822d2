//! Resolution error types.

use miette::Diagnostic;
use thiserror::Error;

/// Error during pin resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    #[error("package `{pin}` isn't available (rule: {rule}){}", format_available(.available))]
    #[diagnostic(
        code(debpin::resolve::unavailable),
        help("Correct the pinned version, or add a source that publishes it")
    )]
    Unavailable {
        pin: String,
        rule: String,
        /// Versions of the same package that the index does have.
        available: Vec<String>,
    },
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!("; available versions: {}", available.join(", "))
    }
}
