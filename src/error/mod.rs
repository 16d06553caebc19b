//! Error types and policies for composed streams.
//!
//! This module provides:
//! - `ErrorPolicy`: Controls whether to fail fast or accumulate errors
//! - `Stage`: Indicates where an error occurred in a fragment's lifecycle
//! - `SingleIoError`: A single fragment error with context
//! - `AggregateError`: A collection of errors when using `Accumulate` policy
//! - `SeekError`: Invalid seek requests, rejected before any state changes

use std::fmt;
use std::io;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop at the first error encountered
    FastFail,
    /// Keep going and report every error together
    #[default]
    Accumulate,
}

impl FromStr for ErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fast_fail" | "fastfail" | "fast-fail" => Ok(ErrorPolicy::FastFail),
            "accumulate" => Ok(ErrorPolicy::Accumulate),
            other => Err(format!("unknown error policy: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Turning a fragment description into an opener
    Resolve,
    /// Error while opening a fragment source
    Open,
    /// Measuring a fragment's length
    Probe,
    Read,
    Seek,
    Close,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Resolve => write!(f, "Resolve"),
            Stage::Open => write!(f, "Open"),
            Stage::Probe => write!(f, "Probe"),
            Stage::Read => write!(f, "Read"),
            Stage::Seek => write!(f, "Seek"),
            Stage::Close => write!(f, "Close"),
        }
    }
}

#[derive(Debug)]
pub struct SingleIoError {
    /// Stage where the error occurred
    pub stage: Stage,
    /// Identifier of the fragment (opener id, file path, `fragment #N`, ...)
    pub target: String,
    /// The underlying error
    pub error: Box<dyn std::error::Error + Send + Sync>,
}

impl SingleIoError {
    pub(crate) fn io(stage: Stage, target: impl Into<String>, error: io::Error) -> Self {
        Self {
            stage,
            target: target.into(),
            error: Box::new(error),
        }
    }

    /// The `io::ErrorKind` of the underlying error, or `Other` when it is not
    /// an I/O error.
    pub fn kind(&self) -> io::ErrorKind {
        self.error
            .downcast_ref::<io::Error>()
            .map(io::Error::kind)
            .unwrap_or(io::ErrorKind::Other)
    }
}

impl fmt::Display for SingleIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.stage, self.target, self.error)
    }
}

impl std::error::Error for SingleIoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.error.as_ref())
    }
}

/// An aggregate of multiple fragment errors.
///
/// This is returned when using `ErrorPolicy::Accumulate` and multiple errors occurred.
#[derive(Debug, Error)]
pub struct AggregateError {
    /// Collection of individual errors
    pub errors: Vec<SingleIoError>,
}

impl fmt::Display for AggregateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "fragment I/O encountered {} error(s):", self.errors.len())?;
        for (i, e) in self.errors.iter().enumerate() {
            writeln!(f, "  #{}: {}", i + 1, e)?;
        }
        Ok(())
    }
}

impl AggregateError {
    /// Create a new aggregate error with a single error.
    pub fn single(error: SingleIoError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// Check if there are no errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Convert into an `io::Error` carrying the kind of the first error.
    pub fn into_io_error(self) -> io::Error {
        let kind = self
            .errors
            .first()
            .map(SingleIoError::kind)
            .unwrap_or(io::ErrorKind::Other);
        io::Error::new(kind, self)
    }
}

impl From<SingleIoError> for AggregateError {
    fn from(error: SingleIoError) -> Self {
        Self::single(error)
    }
}

impl From<AggregateError> for io::Error {
    fn from(agg: AggregateError) -> Self {
        agg.into_io_error()
    }
}

/// A seek request that cannot be honoured.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SeekError {
    /// The whence value is not one of start (0), current (1) or end (2)
    #[error("invalid whence: {0}")]
    InvalidWhence(i32),

    #[error("invalid seek to a negative position")]
    NegativePosition,

    #[error("seek position overflows u64")]
    Overflow,
}

impl From<SeekError> for io::Error {
    fn from(e: SeekError) -> Self {
        io::Error::new(io::ErrorKind::InvalidInput, e)
    }
}

/// Fold the failures of a multi-fragment close into one result.
///
/// A lone failure is returned unchanged. Several failures are reported as an
/// `AggregateError` carrying the first failure's kind.
pub(crate) fn fold_close_errors(mut errors: Vec<(usize, io::Error)>) -> io::Result<()> {
    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0).1),
        _ => Err(AggregateError {
            errors: errors
                .into_iter()
                .map(|(index, e)| SingleIoError::io(Stage::Close, format!("fragment #{index}"), e))
                .collect(),
        }
        .into_io_error()),
    }
}

#[cfg(feature = "miette")]
mod miette_impl;

#[cfg(feature = "miette")]
pub use miette_impl::*;
