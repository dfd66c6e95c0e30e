//! Error taxonomy for the collation kernel.

use crate::types::{ReadingId, TraditionId};

/// Error type surfaced by every engine operation.
///
/// Precondition checks run fully before any mutation is applied to the
/// working copy, so a returned error always means the stored graph is
/// untouched.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// The referenced tradition/section does not exist in the store.
    #[error("tradition not found: {0}")]
    TraditionNotFound(TraditionId),

    /// The referenced reading does not exist in the section.
    #[error("reading not found: {0}")]
    ReadingNotFound(ReadingId),

    /// No entity exists at the requested position, e.g. a witness
    /// neighbor past the section boundary.
    #[error("not found: {0}")]
    NotFound(String),

    /// A named operation precondition failed. The reason is the
    /// user-visible explanation.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A witness traversal could not reach a terminal reading; the
    /// witness's path through the graph is ambiguous or broken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Store-layer failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Wrap a backend error as an internal error.
    pub fn from_store<E: std::error::Error>(e: E) -> Self {
        Self::Internal(e.to_string())
    }

    /// Create an `InvalidOperation` with the given reason.
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidOperation(reason.into())
    }
}
