//! # Record Store
//!
//! The store is the process-wide collaborator through which rules look up
//! and persist records. It is shared by every rule invocation and owned by
//! none of them.

pub mod errors;
pub mod memory;

pub use errors::{StoreError, StoreResult};
pub use memory::InMemoryRecordStore;

use crate::record::{Record, RecordId, Value};

/// Lookup and persistence for records
pub trait RecordStore: Send + Sync {
    /// Find a record of `kind` by id
    fn find_by_id(&self, kind: &str, id: RecordId) -> StoreResult<Option<Record>>;

    /// All records of `kind` whose `field` equals `value`, in insertion order
    fn find_where(&self, kind: &str, field: &str, value: &Value) -> StoreResult<Vec<Record>>;

    /// Insert or update. Assigns an id to new records.
    fn save(&self, record: &mut Record) -> StoreResult<()>;

    /// Fresh copy of a persisted record
    fn reload(&self, record: &Record) -> StoreResult<Record>;

    /// Remove a record
    fn delete(&self, kind: &str, id: RecordId) -> StoreResult<()>;
}
