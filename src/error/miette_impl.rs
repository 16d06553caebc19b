//! Miette integration for pretty error reporting.

use miette::{Diagnostic, Severity};
use thiserror::Error;

use super::{AggregateError, SingleIoError, Stage};

/// A diagnostic for fragment errors, with help naming the failing fragment.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct IoDiagnostic {
    /// The error message
    pub message: String,

    #[source]
    /// The underlying error source
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,

    #[help]
    /// Help text for the user
    pub help: Option<String>,

    #[diagnostic(severity)]
    /// Severity level
    pub severity: Severity,
}

impl From<SingleIoError> for IoDiagnostic {
    fn from(e: SingleIoError) -> Self {
        let target = &e.target;
        let help = match e.stage {
            Stage::Resolve => {
                format!("Fix the manifest entry for '{target}': kind, path and range")
            }
            Stage::Open => format!("Fragment '{target}' could not be opened; is it reachable?"),
            Stage::Probe => format!(
                "Fragment '{target}' must be seekable to its end and hold its whole byte range"
            ),
            Stage::Read | Stage::Seek => {
                format!("Fragment '{target}' failed mid-stream; the stream can be retried")
            }
            Stage::Close => format!("Fragment '{target}' failed to release its source"),
        };
        IoDiagnostic {
            message: format!("[{}] on '{}'", e.stage, e.target),
            source: Some(e.error),
            help: Some(help),
            severity: Severity::Error,
        }
    }
}

impl From<AggregateError> for IoDiagnostic {
    fn from(agg: AggregateError) -> Self {
        let total = agg.len();
        match agg.errors.into_iter().next() {
            Some(e) => {
                let mut diag = IoDiagnostic::from(e);
                if total > 1 {
                    diag.message = format!("{} (and {} more)", diag.message, total - 1);
                }
                diag
            }
            None => IoDiagnostic {
                message: "Unknown fragment error".into(),
                source: None,
                help: None,
                severity: Severity::Error,
            },
        }
    }
}

impl From<AggregateError> for miette::Report {
    fn from(agg: AggregateError) -> Self {
        miette::Report::new(IoDiagnostic::from(agg))
    }
}
