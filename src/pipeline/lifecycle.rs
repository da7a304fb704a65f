//! Validation pipeline
//!
//! Drives a record through its lifecycle, running the rules its type opts
//! into at each point:
//!
//! ```text
//! save:    BeforeValidation -> Validate -> BeforeSave -> persist -> AfterSave
//! destroy: BeforeDestroy -> delete
//! ```
//!
//! Effects returned by a rule are applied before the next rule runs. If the
//! record then fails to persist, those writes are reverted. Saves and
//! destroys of one record type hold that type's writer lock from validation
//! through persistence; after-save rules run outside it, since attachment
//! promotion saves the record again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::config::PipelineConfig;
use super::errors::{PipelineError, PipelineResult};
use crate::observability::{Event, MetricsSnapshot, Observer};
use crate::record::Record;
use crate::registry::{RecordType, Registry, RegistryError};
use crate::rules::{Lifecycle, RecordSaver, RuleContext};
use crate::store::{RecordStore, StoreError};
use crate::validation::Effect;

pub struct ValidationPipeline {
    registry: Registry,
    store: Arc<dyn RecordStore>,
    config: PipelineConfig,
    writers: HashMap<String, Mutex<()>>,
    observer: Observer,
}

impl ValidationPipeline {
    /// Fails if a rule references a record type or field the registry lacks.
    pub fn new(
        registry: Registry,
        store: Arc<dyn RecordStore>,
        config: PipelineConfig,
    ) -> PipelineResult<Self> {
        registry.verify()?;

        let writers = registry
            .names()
            .map(|name| (name.to_string(), Mutex::new(())))
            .collect();
        let observer = Observer::new(config.emit_events);

        let loaded = registry.len();
        let mut names: Vec<&str> = registry.names().collect();
        names.sort_unstable();
        observer.emit_n(
            Event::RecordTypesLoaded,
            loaded as u64,
            &[("count", &loaded.to_string()), ("record_types", &names.join(","))],
        );

        Ok(Self {
            registry,
            store,
            config,
            writers,
            observer,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.observer.metrics().snapshot()
    }

    /// Fresh, unsaved record with every declared field null
    pub fn new_record(&self, kind: &str) -> PipelineResult<Record> {
        Ok(self.registry.instantiate(kind)?)
    }

    /// Clears previous errors and runs the before-validation and validation
    /// rules. `Ok(true)` when the record ends up with no errors.
    pub fn validate(&self, record: &mut Record) -> PipelineResult<bool> {
        let record_type = self.registry.require(record.kind())?;
        self.check(record_type, record, &mut Vec::new())
    }

    /// Validates and persists `record`.
    ///
    /// `Ok(false)` means validation rejected the record and nothing was
    /// written. `Ok(true)` means the record was persisted; an after-save
    /// rule may still have left an error on it (a failed attachment).
    ///
    /// Writes that rules made to other records on the way are undone when
    /// the record itself ends up not persisted.
    pub fn save(&self, record: &mut Record) -> PipelineResult<bool> {
        let record_type = self.registry.require(record.kind())?;

        {
            let _writer = self.writer(record.kind())?;

            let mut undo = Vec::new();
            let persisted = self.persist(record_type, record, &mut undo);
            if !matches!(persisted, Ok(true)) {
                self.roll_back(record.kind(), undo)?;
            }
            if !persisted? {
                return Ok(false);
            }
        }

        self.run_stage(record_type, Lifecycle::AfterSave, record, &mut Vec::new())?;
        Ok(true)
    }

    /// Runs the before-destroy rules and deletes the record if none objected.
    ///
    /// `Ok(false)` leaves the record in place with the reasons as base errors.
    pub fn destroy(&self, record: &mut Record) -> PipelineResult<bool> {
        let record_type = self.registry.require(record.kind())?;
        let _writer = self.writer(record.kind())?;

        record.errors_mut().clear();
        self.run_stage(record_type, Lifecycle::BeforeDestroy, record, &mut Vec::new())?;

        if !record.errors().is_empty() {
            self.observer.emit(
                Event::DestroyBlocked,
                &[("record_type", record.kind()), ("reason", &record.errors().to_string())],
            );
            return Ok(false);
        }

        let id = record
            .id()
            .ok_or_else(|| StoreError::NotPersisted(record.kind().to_string()))?;
        self.store.delete(record.kind(), id)?;

        self.observer.emit(
            Event::RecordDestroyed,
            &[("record_type", record.kind()), ("id", &id.to_string())],
        );
        Ok(true)
    }

    fn check(
        &self,
        record_type: &RecordType,
        record: &mut Record,
        undo: &mut Vec<Undo>,
    ) -> PipelineResult<bool> {
        record.errors_mut().clear();
        self.run_stage(record_type, Lifecycle::BeforeValidation, record, undo)?;
        self.run_stage(record_type, Lifecycle::Validate, record, undo)?;

        let valid = record.errors().is_empty();
        let event = if valid {
            Event::ValidationPassed
        } else {
            Event::ValidationFailed
        };
        let error_count = record.errors().len().to_string();
        self.observer.emit(
            event,
            &[("record_type", record.kind()), ("errors", &error_count)],
        );
        Ok(valid)
    }

    /// Everything up to and including the store write. Caller holds the writer.
    fn persist(
        &self,
        record_type: &RecordType,
        record: &mut Record,
        undo: &mut Vec<Undo>,
    ) -> PipelineResult<bool> {
        if !self.check(record_type, record, undo)? {
            return Ok(false);
        }

        self.run_stage(record_type, Lifecycle::BeforeSave, record, undo)?;
        if !record.errors().is_empty() {
            return Ok(false);
        }

        if let Err(err) = self.store.save(record) {
            self.observer.emit(
                Event::SaveRejected,
                &[("record_type", record.kind()), ("reason", &err.to_string())],
            );
            return Err(err.into());
        }

        let id = record.id().map(|id| id.to_string()).unwrap_or_default();
        self.observer
            .emit(Event::RecordSaved, &[("record_type", record.kind()), ("id", &id)]);
        Ok(true)
    }

    fn run_stage(
        &self,
        record_type: &RecordType,
        stage: Lifecycle,
        record: &mut Record,
        undo: &mut Vec<Undo>,
    ) -> PipelineResult<()> {
        let ctx = RuleContext {
            store: self.store.as_ref(),
            saver: self,
            observer: &self.observer,
        };

        for rule in record_type.rules_at(stage) {
            if !rule.applies_to(record) {
                continue;
            }
            let outcome = rule.apply(record, &ctx)?;
            self.apply(outcome.into_effects(), undo)?;
        }
        Ok(())
    }

    /// Effects bypass the rules of the records they touch. The stored copy
    /// each one replaces is kept in `undo`.
    fn apply(&self, effects: Vec<Effect>, undo: &mut Vec<Undo>) -> PipelineResult<()> {
        for effect in effects {
            match effect {
                Effect::Persist(mut other) => {
                    let prior = match other.id() {
                        Some(id) => self.store.find_by_id(other.kind(), id)?,
                        None => None,
                    };
                    self.store.save(&mut other)?;
                    undo.push(match prior {
                        Some(prior) => Undo::Restore(prior),
                        None => Undo::Remove(other),
                    });
                }
            }
        }
        Ok(())
    }

    /// Puts every record touched by an effect back the way it was, newest
    /// write first.
    fn roll_back(&self, kind: &str, undo: Vec<Undo>) -> PipelineResult<()> {
        if undo.is_empty() {
            return Ok(());
        }
        let count = undo.len();

        for step in undo.into_iter().rev() {
            match step {
                Undo::Restore(mut prior) => self.store.save(&mut prior)?,
                Undo::Remove(written) => {
                    if let Some(id) = written.id() {
                        self.store.delete(written.kind(), id)?;
                    }
                }
            }
        }

        self.observer.emit(
            Event::EffectsRolledBack,
            &[("record_type", kind), ("count", &count.to_string())],
        );
        Ok(())
    }

    fn writer(&self, kind: &str) -> PipelineResult<Option<MutexGuard<'_, ()>>> {
        if !self.config.serialize_writes {
            return Ok(None);
        }
        let lock = self
            .writers
            .get(kind)
            .ok_or_else(|| RegistryError::unknown_record_type(kind))?;
        lock.lock().map(Some).map_err(|_| {
            self.observer
                .emit(Event::WriterPoisoned, &[("record_type", kind)]);
            PipelineError::WriterPoisoned(kind.to_string())
        })
    }
}

/// How to reverse one effect
enum Undo {
    /// Save this stored copy back over the effect's write
    Restore(Record),
    /// The effect created this record; delete it
    Remove(Record),
}

impl RecordSaver for ValidationPipeline {
    fn instantiate(&self, kind: &str) -> PipelineResult<Record> {
        self.new_record(kind)
    }

    fn save(&self, record: &mut Record) -> PipelineResult<bool> {
        ValidationPipeline::save(self, record)
    }
}
