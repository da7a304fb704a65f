//! The record: identity, attributes and the error collection of the
//! current validation pass.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::accessor::Accessor;
use super::value::{RecordId, Value};
use crate::validation::ErrorCollection;

static NULL: Value = Value::Null;

/// A persistent, validatable entity.
///
/// `id` is `None` until the record is saved for the first time; after that it
/// never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<RecordId>,
    attributes: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    errors: ErrorCollection,
}

impl Record {
    /// Create a new, unsaved record with every declared field set to null
    pub fn new<I, S>(kind: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: kind.into(),
            id: None,
            attributes: fields.into_iter().map(|f| (f.into(), Value::Null)).collect(),
            updated_at: None,
            errors: ErrorCollection::new(),
        }
    }

    /// Builder-style attribute assignment
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.set(field, value.into());
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> Option<RecordId> {
        self.id
    }

    /// True until the record has been persisted once
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    pub fn errors(&self) -> &ErrorCollection {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ErrorCollection {
        &mut self.errors
    }

    /// Called by store implementations after a successful write.
    ///
    /// The id is only assigned once; later calls keep the original id.
    pub fn mark_persisted(&mut self, id: RecordId, at: DateTime<Utc>) {
        if self.id.is_none() {
            self.id = Some(id);
        }
        self.updated_at = Some(at);
    }

    /// Replace identity and attributes with a freshly loaded copy.
    /// Errors from the current pass are kept.
    pub fn refresh_from(&mut self, stored: &Record) {
        self.id = stored.id;
        self.attributes = stored.attributes.clone();
        self.updated_at = stored.updated_at;
    }

    /// Copy suitable for persisting: same identity and attributes, no errors.
    pub fn persisted_copy(&self) -> Record {
        Record {
            kind: self.kind.clone(),
            id: self.id,
            attributes: self.attributes.clone(),
            updated_at: self.updated_at,
            errors: ErrorCollection::new(),
        }
    }
}

impl Accessor for Record {
    fn get(&self, field: &str) -> &Value {
        self.attributes.get(field).unwrap_or(&NULL)
    }

    /// Fields the record was not created with are ignored.
    fn set(&mut self, field: &str, value: Value) {
        if let Some(slot) = self.attributes.get_mut(field) {
            *slot = value;
        }
    }

    fn responds_to(&self, field: &str) -> bool {
        self.attributes.contains_key(field)
    }
}
