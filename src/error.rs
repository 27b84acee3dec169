//! Error types for the analysis core.

use thiserror::Error;

/// Errors raised by the analysis entry points.
///
/// Unresolved references and infeasible partitions are not errors; they are
/// represented in the returned graphs and partitions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// An argument failed validation before any computation started.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// Linkage name not recognised.
    #[error("unknown linkage `{0}` (expected single, complete or average)")]
    UnknownLinkage(String),

    /// Output format name not recognised.
    #[error("unknown output format `{0}` (expected json or dot)")]
    UnknownFormat(String),
}

impl AnalysisError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
