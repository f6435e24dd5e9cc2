//! Non-fatal compiler diagnostics.
//!
//! Warnings never abort a compilation; they travel alongside the generated
//! File IR so callers can surface them. Fatal problems are
//! [`CompileError`](crate::error::CompileError)s instead.

use std::fmt;

/// Severity level for a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Generation continued but something was skipped or synthesized
    Warning,
    /// Informational note
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A diagnostic raised while compiling a description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Where the issue occurred (e.g. `operation:get_pet`, `schema:Pet`)
    pub location: String,
    /// Severity of the issue
    pub severity: Severity,
    /// Short machine-readable kind (e.g. `skipped_status`, `synthesized_operation_id`)
    pub kind: String,
    /// Human-readable description
    pub message: String,
}

impl Diagnostic {
    /// Create a warning
    pub fn warning(
        location: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            location: location.into(),
            severity: Severity::Warning,
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create an informational note
    pub fn info(
        location: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            location: location.into(),
            severity: Severity::Info,
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}] {}: {}",
            self.severity, self.kind, self.location, self.message
        )
    }
}

/// Print diagnostics to stderr, one per line
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for d in diagnostics {
        eprintln!("{d}");
    }
}
