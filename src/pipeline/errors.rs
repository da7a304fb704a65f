//! Pipeline errors
//!
//! Validation failures are not errors: they live in the record's error
//! collection and `save`/`validate`/`destroy` report them as `Ok(false)`.
//! These are the failures of the collaborators around the rules.

use thiserror::Error;

use crate::registry::RegistryError;
use crate::store::StoreError;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// A thread panicked while holding the writer lock for this record type
    #[error("Writer lock for {0} poisoned")]
    WriterPoisoned(String),
}

impl PipelineError {
    /// Whether the caller can fix the record or configuration and retry
    pub fn is_recoverable(&self) -> bool {
        match self {
            PipelineError::Store(err) => err.is_recoverable(),
            PipelineError::Registry(err) => !err.is_fatal(),
            PipelineError::WriterPoisoned(_) => false,
        }
    }
}
