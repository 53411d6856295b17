//! Error types.
//!
//! - [`ParseError`] is per-record and never escapes the loader.
//! - [`PipelineError`] is what the core returns to its callers.
//! - [`AppError`] is what the `gold` binary reports (message + process exit code).

use thiserror::Error;

use crate::domain::Tier;

/// A raw price text did not yield three currency amounts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected 3 currency amounts, found {found}")]
    MissingAmounts { found: usize },

    #[error("invalid currency amount '{0}'")]
    InvalidAmount(String),
}

/// Errors surfaced by the data pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    /// Remote resource unreachable or returned a non-success status.
    #[error("data unavailable: {0}")]
    Fetch(String),

    /// Fetched bytes could not be decoded as a price sheet.
    #[error("unreadable price sheet: {0}")]
    Payload(String),

    /// Caller-supplied date range rejected before any computation.
    #[error("{0}")]
    Validation(String),

    /// Not enough history to fit a trend line for a tier.
    #[error("not enough history to forecast {tier} prices ({points} point(s), need at least 2)")]
    InsufficientData { tier: Tier, points: usize },
}

impl PipelineError {
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Validation(_) => 2,
            PipelineError::Fetch(_) | PipelineError::Payload(_) => 3,
            PipelineError::InsufficientData { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
