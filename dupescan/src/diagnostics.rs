//! Run-log messages emitted while a scan progresses.
//!
//! The pipeline never prints. Front ends hand [`crate::operations::run_scan`]
//! a [`DiagnosticSink`] and decide what to do with each line.

use std::fmt::Display;

/// A single run-log message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Stage progress such as "Found 412 IDs".
    Progress(String),

    /// No language entry existed, so the name was synthesized from the id.
    MissingLocalization { id: String, key: String },
}

impl Diagnostic {
    pub fn progress(message: impl Into<String>) -> Self {
        Diagnostic::Progress(message.into())
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::Progress(message) => f.write_str(message),
            Diagnostic::MissingLocalization { id, key } => {
                write!(f, "[WARN] Missing lang key for {} ({})", id, key)
            }
        }
    }
}

/// Receives run-log messages.
///
/// Implemented for every `FnMut(Diagnostic)` closure, so a test can collect
/// messages with `|d| seen.push(d)`.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: FnMut(Diagnostic),
{
    fn report(&mut self, diagnostic: Diagnostic) {
        (*self)(diagnostic)
    }
}

/// Forwards run-log messages to `tracing`: progress at `info`, missing
/// localization at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::Progress(message) => tracing::info!("{}", message),
            Diagnostic::MissingLocalization { id, key } => {
                tracing::warn!(%id, %key, "missing lang key")
            }
        }
    }
}
