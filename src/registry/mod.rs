//! Record type registry
//!
//! Every record type that takes part in validation is registered here with
//! its field table and the rules it opts into. Registration validates each
//! definition; [`Registry::verify`] additionally checks references between
//! types once all of them are known.

mod errors;
mod loader;
mod types;

pub use errors::{RegistryError, RegistryErrorCode, RegistryResult, Severity};
pub use loader::RegistryLoader;
pub use types::{FieldKind, RecordType};

use std::collections::BTreeMap;

use crate::record::Record;

/// In-memory registry of record types, keyed by name
#[derive(Debug, Clone, Default)]
pub struct Registry {
    types: BTreeMap<String, RecordType>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a record type. Names are immutable once registered.
    pub fn register(&mut self, record_type: RecordType) -> RegistryResult<()> {
        record_type.validate_structure()?;

        if self.types.contains_key(&record_type.name) {
            return Err(RegistryError::immutable(&record_type.name));
        }

        self.types.insert(record_type.name.clone(), record_type);
        Ok(())
    }

    /// Builder-style registration
    pub fn with(mut self, record_type: RecordType) -> RegistryResult<Self> {
        self.register(record_type)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&RecordType> {
        self.types.get(name)
    }

    /// Like [`Registry::get`], failing with `MORSE_UNKNOWN_RECORD_TYPE`
    pub fn require(&self, name: &str) -> RegistryResult<&RecordType> {
        self.get(name)
            .ok_or_else(|| RegistryError::unknown_record_type(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Fresh, unsaved record of `name`
    pub fn instantiate(&self, name: &str) -> RegistryResult<Record> {
        Ok(self.require(name)?.instantiate())
    }

    /// Checks cross-type references: foreign-key targets and attachment
    /// targets are registered and declare the fields the rules rely on.
    pub fn verify(&self) -> RegistryResult<()> {
        for record_type in self.types.values() {
            for rule in &record_type.rules {
                for target in rule.referenced_types() {
                    self.require(target)?;
                }
                for requirement in rule.requirements() {
                    if let Some(target) = requirement.record_type {
                        self.require(target)?.check_requirement(&requirement)?;
                    }
                }
            }
        }
        Ok(())
    }
}
