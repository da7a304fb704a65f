//! Rule catalog
//!
//! The eight invariant-maintenance rules a record type can opt into. Each
//! rule reads and writes the record through [`Accessor`](crate::record::Accessor),
//! may query the store, may append to the record's error collection, and
//! returns writes to other records as effects rather than performing them.
//!
//! | Rule                     | Lifecycle point    |
//! |--------------------------|--------------------|
//! | `blank_to_nil`           | before validation  |
//! | `there_must_be_one`      | before validation  |
//! | `integer_or_default`     | before validation  |
//! | `associated_exists`      | validation         |
//! | `mandatory_boolean`      | validation         |
//! | `there_can_be_only_one`  | before save        |
//! | `process_attachment`     | after save         |
//! | `survive_if`             | before destroy     |

mod attachment;
mod blank;
mod boolean;
mod default_exists;
mod defaults;
mod exclusivity;
mod foreign_key;
mod guard;

pub use attachment::{process_attachment, AttachmentConfig};
pub use blank::blank_to_nil;
pub use boolean::mandatory_boolean;
pub use default_exists::there_must_be_one;
pub use defaults::integer_or_default;
pub use exclusivity::there_can_be_only_one;
pub use foreign_key::associated_exists;
pub use guard::survive_if;

use serde::{Deserialize, Serialize};

use crate::observability::Observer;
use crate::pipeline::PipelineResult;
use crate::record::{Accessor, Record};
use crate::registry::FieldKind;
use crate::store::RecordStore;
use crate::validation::RuleOutcome;

/// Message for a foreign key that does not resolve
pub const DOES_NOT_EXIST: &str = "does not exist";
/// Message for an attachment whose child record could not be saved
pub const HAD_A_PROBLEM_SAVING: &str = "had a problem saving";
/// Default message for a mandatory boolean
pub const MUST_BE_TRUE: &str = "must be true";

const ANY_KIND: &[FieldKind] = &[
    FieldKind::Bool,
    FieldKind::Int,
    FieldKind::Text,
    FieldKind::List,
    FieldKind::Reference,
    FieldKind::Upload,
];

/// Point in a record's lifecycle at which a rule runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    BeforeValidation,
    Validate,
    BeforeSave,
    AfterSave,
    BeforeDestroy,
}

/// A field a rule needs, on its own record type (`record_type: None`) or on
/// another one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRequirement<'a> {
    pub record_type: Option<&'a str>,
    pub field: &'a str,
    pub kinds: &'static [FieldKind],
}

impl<'a> FieldRequirement<'a> {
    fn own(field: &'a str, kinds: &'static [FieldKind]) -> Self {
        Self {
            record_type: None,
            field,
            kinds,
        }
    }
}

/// Saves records through the full pipeline (their own rules included).
///
/// Rules that create records of other types, such as attachment promotion,
/// go through this seam instead of writing to the store directly.
pub trait RecordSaver {
    /// Fresh, unsaved record of `kind`
    fn instantiate(&self, kind: &str) -> PipelineResult<Record>;

    /// Validate and persist; `Ok(false)` when validation rejected the record
    fn save(&self, record: &mut Record) -> PipelineResult<bool>;
}

/// Collaborators available to a rule invocation
pub struct RuleContext<'a> {
    pub store: &'a dyn RecordStore,
    pub saver: &'a dyn RecordSaver,
    pub observer: &'a Observer,
}

/// A rule declared on a record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// Foreign key must resolve; dangling keys are cleared
    AssociatedExists {
        field: String,
        target: String,
        #[serde(default = "default_required")]
        required: bool,
    },
    /// Blank values become null
    BlankToNil { field: String },
    /// Promote a pending upload to a child record
    ProcessAttachment(AttachmentConfig),
    /// Block destruction while a flag is set or a collection has members
    SurviveIf { field: String },
    /// Demote every other record holding the flag
    ThereCanBeOnlyOne { field: String },
    /// Claim the flag when nobody holds it
    ThereMustBeOne { field: String },
    /// Fill a falsy field with a default
    IntegerOrDefault { field: String, default: i64 },
    /// Field must be exactly `true`
    MandatoryBoolean {
        field: String,
        #[serde(default = "default_message")]
        message: String,
    },
}

fn default_required() -> bool {
    true
}

fn default_message() -> String {
    MUST_BE_TRUE.to_string()
}

impl Rule {
    pub fn associated_exists(field: impl Into<String>, target: impl Into<String>) -> Self {
        Rule::AssociatedExists {
            field: field.into(),
            target: target.into(),
            required: true,
        }
    }

    /// Foreign key that may be absent; dangling ids are still cleared
    pub fn optional_association(field: impl Into<String>, target: impl Into<String>) -> Self {
        Rule::AssociatedExists {
            field: field.into(),
            target: target.into(),
            required: false,
        }
    }

    pub fn blank_to_nil(field: impl Into<String>) -> Self {
        Rule::BlankToNil { field: field.into() }
    }

    pub fn process_attachment(config: AttachmentConfig) -> Self {
        Rule::ProcessAttachment(config)
    }

    pub fn survive_if(field: impl Into<String>) -> Self {
        Rule::SurviveIf { field: field.into() }
    }

    pub fn there_can_be_only_one(field: impl Into<String>) -> Self {
        Rule::ThereCanBeOnlyOne { field: field.into() }
    }

    pub fn there_must_be_one(field: impl Into<String>) -> Self {
        Rule::ThereMustBeOne { field: field.into() }
    }

    pub fn integer_or_default(field: impl Into<String>, default: i64) -> Self {
        Rule::IntegerOrDefault {
            field: field.into(),
            default,
        }
    }

    pub fn mandatory_boolean(field: impl Into<String>) -> Self {
        Self::mandatory_boolean_with(field, MUST_BE_TRUE)
    }

    pub fn mandatory_boolean_with(field: impl Into<String>, message: impl Into<String>) -> Self {
        Rule::MandatoryBoolean {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Stable snake_case name, as used in definition files
    pub fn name(&self) -> &'static str {
        match self {
            Rule::AssociatedExists { .. } => "associated_exists",
            Rule::BlankToNil { .. } => "blank_to_nil",
            Rule::ProcessAttachment(_) => "process_attachment",
            Rule::SurviveIf { .. } => "survive_if",
            Rule::ThereCanBeOnlyOne { .. } => "there_can_be_only_one",
            Rule::ThereMustBeOne { .. } => "there_must_be_one",
            Rule::IntegerOrDefault { .. } => "integer_or_default",
            Rule::MandatoryBoolean { .. } => "mandatory_boolean",
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match self {
            Rule::BlankToNil { .. } | Rule::ThereMustBeOne { .. } | Rule::IntegerOrDefault { .. } => {
                Lifecycle::BeforeValidation
            }
            Rule::AssociatedExists { .. } | Rule::MandatoryBoolean { .. } => Lifecycle::Validate,
            Rule::ThereCanBeOnlyOne { .. } => Lifecycle::BeforeSave,
            Rule::ProcessAttachment(_) => Lifecycle::AfterSave,
            Rule::SurviveIf { .. } => Lifecycle::BeforeDestroy,
        }
    }

    /// Whether the pipeline should run the rule on `record` at all.
    ///
    /// Exclusivity only fires for a record that is claiming the flag;
    /// saving a record without it must not strip the current holder.
    pub fn applies_to(&self, record: &Record) -> bool {
        match self {
            Rule::ThereCanBeOnlyOne { field } => record.get(field).is_true(),
            _ => true,
        }
    }

    /// Fields the rule reads or writes, with the kinds it accepts
    pub fn requirements(&self) -> Vec<FieldRequirement<'_>> {
        match self {
            Rule::AssociatedExists { field, .. } => {
                vec![FieldRequirement::own(field, &[FieldKind::Reference])]
            }
            Rule::BlankToNil { field } => vec![FieldRequirement::own(field, ANY_KIND)],
            Rule::ProcessAttachment(config) => vec![
                FieldRequirement::own(&config.source, &[FieldKind::Upload]),
                FieldRequirement::own(&config.relation, &[FieldKind::Reference]),
                FieldRequirement {
                    record_type: Some(&config.target),
                    field: &config.source,
                    kinds: &[FieldKind::Upload],
                },
            ],
            Rule::SurviveIf { field } => {
                vec![FieldRequirement::own(field, &[FieldKind::Bool, FieldKind::List])]
            }
            Rule::ThereCanBeOnlyOne { field } | Rule::ThereMustBeOne { field } => {
                vec![FieldRequirement::own(field, &[FieldKind::Bool])]
            }
            Rule::IntegerOrDefault { field, .. } => {
                vec![FieldRequirement::own(field, &[FieldKind::Int])]
            }
            Rule::MandatoryBoolean { field, .. } => {
                vec![FieldRequirement::own(field, &[FieldKind::Bool])]
            }
        }
    }

    /// Other record types this rule looks up or creates
    pub fn referenced_types(&self) -> Vec<&str> {
        match self {
            Rule::AssociatedExists { target, .. } => vec![target.as_str()],
            Rule::ProcessAttachment(config) => vec![config.target.as_str()],
            _ => Vec::new(),
        }
    }

    /// Run the rule against `record`
    pub fn apply(&self, record: &mut Record, ctx: &RuleContext<'_>) -> PipelineResult<RuleOutcome> {
        let outcome = match self {
            Rule::AssociatedExists {
                field,
                target,
                required,
            } => associated_exists(record, field, target, *required, ctx)?,
            Rule::BlankToNil { field } => blank_to_nil(record, field),
            Rule::ProcessAttachment(config) => process_attachment(record, config, ctx)?,
            Rule::SurviveIf { field } => survive_if(record, field),
            Rule::ThereCanBeOnlyOne { field } => there_can_be_only_one(record, field, ctx)?,
            Rule::ThereMustBeOne { field } => there_must_be_one(record, field, ctx)?,
            Rule::IntegerOrDefault { field, default } => integer_or_default(record, field, *default),
            Rule::MandatoryBoolean { field, message } => mandatory_boolean(record, field, message),
        };
        Ok(outcome)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Minimal collaborators for exercising rules without a pipeline.

    use super::*;
    use crate::store::{InMemoryRecordStore, RecordStore as _};

    /// Saves straight to the store; no rules run.
    pub struct StoreSaver<'a> {
        pub store: &'a InMemoryRecordStore,
        pub fields: Vec<&'static str>,
    }

    impl RecordSaver for StoreSaver<'_> {
        fn instantiate(&self, kind: &str) -> PipelineResult<Record> {
            Ok(Record::new(kind, self.fields.iter().copied()))
        }

        fn save(&self, record: &mut Record) -> PipelineResult<bool> {
            self.store.save(record)?;
            Ok(true)
        }
    }

    pub fn quiet() -> Observer {
        Observer::new(false)
    }
}
