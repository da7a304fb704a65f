//! In-memory record store
//!
//! Used by tests and by hosts that keep records in process. Supports an
//! opt-in storage-level exclusive-flag constraint so the at-most-one
//! invariant does not rest on cooperative rules alone.

use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use super::errors::{StoreError, StoreResult};
use super::RecordStore;
use crate::record::{Accessor, Record, RecordId, Value};

/// In-memory record store
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<String, Vec<Record>>>,
    /// (kind, field) pairs where at most one record may hold `true`
    exclusive_flags: Vec<(String, String)>,
    /// Kinds whose saves are refused
    rejected_kinds: RwLock<HashSet<String>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enforce at-most-one-true on `field` for `kind` at the storage layer
    pub fn with_exclusive_flag(mut self, kind: impl Into<String>, field: impl Into<String>) -> Self {
        self.exclusive_flags.push((kind.into(), field.into()));
        self
    }

    /// Refuse every subsequent save of `kind`
    pub fn reject_saves_of(&self, kind: impl Into<String>) -> StoreResult<()> {
        let mut rejected = self.rejected_kinds.write().map_err(|_| StoreError::LockPoisoned)?;
        rejected.insert(kind.into());
        Ok(())
    }

    /// Accept saves of `kind` again
    pub fn accept_saves_of(&self, kind: &str) -> StoreResult<()> {
        let mut rejected = self.rejected_kinds.write().map_err(|_| StoreError::LockPoisoned)?;
        rejected.remove(kind);
        Ok(())
    }

    /// Number of stored records of `kind`
    pub fn count(&self, kind: &str) -> StoreResult<usize> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.get(kind).map_or(0, Vec::len))
    }

    /// Every stored record of `kind`, in insertion order
    pub fn all(&self, kind: &str) -> StoreResult<Vec<Record>> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.get(kind).cloned().unwrap_or_default())
    }

    fn check_exclusive_flags(&self, stored: &[Record], record: &Record) -> StoreResult<()> {
        for (kind, field) in &self.exclusive_flags {
            if kind != record.kind() || !record.get(field).is_true() {
                continue;
            }
            let conflict = stored
                .iter()
                .any(|other| other.id() != record.id() && other.get(field).is_true());
            if conflict {
                return Err(StoreError::ExclusiveFlagViolation {
                    kind: kind.clone(),
                    field: field.clone(),
                });
            }
        }
        Ok(())
    }
}

impl RecordStore for InMemoryRecordStore {
    fn find_by_id(&self, kind: &str, id: RecordId) -> StoreResult<Option<Record>> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records
            .get(kind)
            .and_then(|list| list.iter().find(|r| r.id() == Some(id)))
            .cloned())
    }

    fn find_where(&self, kind: &str, field: &str, value: &Value) -> StoreResult<Vec<Record>> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records
            .get(kind)
            .map(|list| list.iter().filter(|r| r.get(field) == value).cloned().collect())
            .unwrap_or_default())
    }

    fn save(&self, record: &mut Record) -> StoreResult<()> {
        {
            let rejected = self.rejected_kinds.read().map_err(|_| StoreError::LockPoisoned)?;
            if rejected.contains(record.kind()) {
                return Err(StoreError::Rejected {
                    kind: record.kind().to_string(),
                    reason: "store refuses writes for this record type".into(),
                });
            }
        }

        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        let list = records.entry(record.kind().to_string()).or_default();

        self.check_exclusive_flags(list, record)?;

        let id = record.id().unwrap_or_else(RecordId::generate);
        record.mark_persisted(id, Utc::now());

        let stored = record.persisted_copy();
        match list.iter_mut().find(|r| r.id() == Some(id)) {
            Some(existing) => *existing = stored,
            None => list.push(stored),
        }
        Ok(())
    }

    fn reload(&self, record: &Record) -> StoreResult<Record> {
        let id = record
            .id()
            .ok_or_else(|| StoreError::NotPersisted(record.kind().to_string()))?;
        self.find_by_id(record.kind(), id)?.ok_or_else(|| StoreError::NotFound {
            kind: record.kind().to_string(),
            id,
        })
    }

    fn delete(&self, kind: &str, id: RecordId) -> StoreResult<()> {
        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        let list = records.entry(kind.to_string()).or_default();

        let len_before = list.len();
        list.retain(|r| r.id() != Some(id));

        if list.len() == len_before {
            Err(StoreError::NotFound {
                kind: kind.to_string(),
                id,
            })
        } else {
            Ok(())
        }
    }
}
