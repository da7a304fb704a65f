//! Record type definitions
//!
//! A record type is a field table plus the list of rules it opts into.
//! Definitions are plain data and round-trip through JSON:
//!
//! ```json
//! {
//!   "name": "land",
//!   "fields": { "name": "text", "default_land": "bool" },
//!   "rules": [
//!     { "rule": "there_must_be_one", "field": "default_land" },
//!     { "rule": "there_can_be_only_one", "field": "default_land" }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::errors::{RegistryError, RegistryResult};
use crate::record::Record;
use crate::rules::{FieldRequirement, Lifecycle, Rule};

/// Declared kind of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Bool,
    Int,
    Text,
    /// Collection-valued attribute
    List,
    /// Foreign key holding another record's id
    Reference,
    Upload,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int => "int",
            FieldKind::Text => "text",
            FieldKind::List => "list",
            FieldKind::Reference => "reference",
            FieldKind::Upload => "upload",
        }
    }
}

/// A record type: name, field table and rule list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordType {
    pub name: String,
    pub fields: BTreeMap<String, FieldKind>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RecordType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
            rules: Vec::new(),
        }
    }

    /// Declare a field
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    /// Opt into a rule. Rules at the same lifecycle point run in the order
    /// they were added.
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn field_kind(&self, field: &str) -> Option<FieldKind> {
        self.fields.get(field).copied()
    }

    /// Rules that run at `stage`, in declaration order
    pub fn rules_at(&self, stage: Lifecycle) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |r| r.lifecycle() == stage)
    }

    /// Fresh, unsaved instance with every field null
    pub fn instantiate(&self) -> Record {
        Record::new(self.name.clone(), self.fields.keys().cloned())
    }

    /// Validates the definition itself: identifier names, and every rule
    /// refers to a declared field of a suitable kind on this type.
    ///
    /// References to other record types are checked by the registry.
    pub fn validate_structure(&self) -> RegistryResult<()> {
        if !is_identifier(&self.name) {
            return Err(RegistryError::malformed(&self.name, "record type name must be an identifier"));
        }
        if let Some(bad) = self.fields.keys().find(|f| !is_identifier(f)) {
            return Err(RegistryError::malformed(
                &self.name,
                format!("'{}' is not a valid field name", bad),
            ));
        }

        for rule in &self.rules {
            for requirement in rule.requirements().iter().filter(|r| r.record_type.is_none()) {
                self.check_requirement(requirement)?;
            }
        }

        Ok(())
    }

    /// Checks that this type declares `requirement.field` with an accepted kind
    pub(crate) fn check_requirement(&self, requirement: &FieldRequirement<'_>) -> RegistryResult<()> {
        match self.field_kind(requirement.field) {
            None => Err(RegistryError::unknown_field(&self.name, requirement.field)),
            Some(kind) if !requirement.kinds.contains(&kind) => {
                let expected: Vec<_> = requirement.kinds.iter().map(FieldKind::name).collect();
                Err(RegistryError::kind_mismatch(
                    &self.name,
                    requirement.field,
                    expected.join(" or "),
                    kind.name(),
                ))
            }
            Some(_) => Ok(()),
        }
    }
}

/// Lower-case ASCII identifier: `[a-z_][a-z0-9_]*`
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
