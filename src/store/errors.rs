//! # Record Store Errors

use thiserror::Error;

use crate::record::RecordId;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Record store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{kind} {id} not found")]
    NotFound { kind: String, id: RecordId },

    #[error("{0} record has not been persisted")]
    NotPersisted(String),

    #[error("Save of {kind} rejected: {reason}")]
    Rejected { kind: String, reason: String },

    /// Storage-level exclusivity constraint tripped
    #[error("At most one {kind} may have {field} set")]
    ExclusiveFlagViolation { kind: String, field: String },

    #[error("Lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Whether the caller can fix the input and retry
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, StoreError::LockPoisoned)
    }
}
