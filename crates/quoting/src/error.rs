// ABOUTME: Error types for the quoting normalizer including ErrorCode enum and QuotingError struct.
// ABOUTME: Provides categorized errors with convenience constructors and boolean helpers.

use std::fmt;

/// Error codes representing different categories of quoting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Sibling structure contradicted the fusion lookahead.
    Inconsistency,
    Selector,
    Io,
    Config,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::Inconsistency => "internal inconsistency",
            ErrorCode::Selector => "invalid selector",
            ErrorCode::Io => "io error",
            ErrorCode::Config => "config error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for quoting operations.
#[derive(Debug, thiserror::Error)]
pub struct QuotingError {
    pub code: ErrorCode,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for QuotingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "quoting: {}: {}", self.op, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl QuotingError {
    fn new(code: ErrorCode, op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self {
            code,
            op: op.into(),
            source,
        }
    }

    /// Create an Inconsistency error.
    pub fn inconsistency(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorCode::Inconsistency, op, source)
    }

    /// Create a Selector error.
    pub fn selector(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorCode::Selector, op, source)
    }

    /// Create an Io error.
    pub fn io(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorCode::Io, op, source)
    }

    /// Create a Config error.
    pub fn config(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorCode::Config, op, source)
    }

    pub fn is_inconsistency(&self) -> bool {
        self.code == ErrorCode::Inconsistency
    }

    pub fn is_selector(&self) -> bool {
        self.code == ErrorCode::Selector
    }

    pub fn is_io(&self) -> bool {
        self.code == ErrorCode::Io
    }

    pub fn is_config(&self) -> bool {
        self.code == ErrorCode::Config
    }
}

/// Convenience alias for results carrying a [`QuotingError`].
pub type Result<T> = std::result::Result<T, QuotingError>;
