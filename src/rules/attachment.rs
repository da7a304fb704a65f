//! Attachment promotion
//!
//! A pending upload on the parent is wrapped in a child record of the target
//! type. Once the child is saved the parent points at it and the upload slot
//! is cleared; if the child cannot be saved the upload stays put so the
//! caller can fix things and resubmit.
//!
//! The child save and the parent re-save are two separate writes. A failure
//! between them leaves an unreferenced child behind, which is harmless.

use serde::{Deserialize, Serialize};

use super::{RuleContext, HAD_A_PROBLEM_SAVING};
use crate::observability::Event;
use crate::pipeline::{PipelineError, PipelineResult};
use crate::record::{Accessor, Record, Value};
use crate::validation::RuleOutcome;

/// Where the upload comes from and what it becomes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AttachmentConfigDef")]
pub struct AttachmentConfig {
    /// Child record type
    pub target: String,
    /// Upload field, on the parent and on the child
    pub source: String,
    /// Parent field receiving the child's id
    pub relation: String,
}

impl AttachmentConfig {
    /// Relation defaults to `<target>_id`
    pub fn new(target: impl Into<String>, source: impl Into<String>) -> Self {
        let target = target.into();
        Self {
            relation: format!("{}_id", target),
            target,
            source: source.into(),
        }
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation = relation.into();
        self
    }
}

impl Default for AttachmentConfig {
    fn default() -> Self {
        Self::new("asset", "attachment")
    }
}

/// On-disk shape: every key optional.
#[derive(Deserialize)]
struct AttachmentConfigDef {
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    relation: Option<String>,
}

impl From<AttachmentConfigDef> for AttachmentConfig {
    fn from(def: AttachmentConfigDef) -> Self {
        let defaults = AttachmentConfig::default();
        let config = AttachmentConfig::new(
            def.target.unwrap_or(defaults.target),
            def.source.unwrap_or(defaults.source),
        );
        match def.relation {
            Some(relation) => config.with_relation(relation),
            None => config,
        }
    }
}

/// Promote a pending upload on `record` to a child record.
///
/// Runs after the parent has been saved. Whatever happens, a parent whose id
/// resolves in the store is reloaded at the end so its attributes reflect
/// what was persisted. Errors added here survive the reload.
pub fn process_attachment(
    record: &mut Record,
    config: &AttachmentConfig,
    ctx: &RuleContext<'_>,
) -> PipelineResult<RuleOutcome> {
    let mut outcome = RuleOutcome::valid();
    let pending = record.get(&config.source).clone();

    if !pending.is_null() {
        let mut child = ctx.saver.instantiate(&config.target)?;
        child.set(&config.source, pending);

        let saved = match ctx.saver.save(&mut child) {
            Ok(saved) => saved,
            Err(PipelineError::Store(_)) => false,
            Err(other) => return Err(other),
        };

        match child.id().filter(|_| saved) {
            Some(child_id) => {
                record.set(&config.relation, Value::Ref(child_id));
                record.set(&config.source, Value::Null);
                ctx.observer.emit(
                    Event::AttachmentPromoted,
                    &[
                        ("record_type", record.kind()),
                        ("target", &config.target),
                        ("child", &child_id.to_string()),
                    ],
                );
                // A rejected re-save leaves its errors on the record.
                ctx.saver.save(record)?;
            }
            None => {
                record.errors_mut().add(&config.source, HAD_A_PROBLEM_SAVING);
                ctx.observer.emit(
                    Event::AttachmentFailed,
                    &[("record_type", record.kind()), ("target", &config.target)],
                );
                outcome = RuleOutcome::invalid();
            }
        }
    }

    if let Some(id) = record.id() {
        if ctx.store.find_by_id(record.kind(), id)?.is_some() {
            let stored = ctx.store.reload(record)?;
            record.refresh_from(&stored);
        }
    }

    Ok(outcome)
}
