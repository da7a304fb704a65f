//! Events raised while rules and the pipeline work on records
//!
//! Every write a rule performs on the caller's behalf has an event, so a
//! silent change (a cleared key, a demoted rival) always leaves a log line.

use std::fmt;

use super::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// A dangling foreign key was set to null
    ReferenceCleared,
    /// Another record lost an exclusive flag
    RivalDemoted,
    /// A record claimed a flag nobody held
    DefaultFlagAssigned,
    /// A pending upload became a child record
    AttachmentPromoted,
    /// The child record for an upload could not be saved
    AttachmentFailed,
    /// A destroy was refused by a guard
    DestroyBlocked,
    ValidationPassed,
    ValidationFailed,
    /// The store refused a validated record
    SaveRejected,
    /// Writes to other records were undone because the record was not saved
    EffectsRolledBack,
    RecordSaved,
    RecordDestroyed,
    /// Record types were handed to a pipeline
    RecordTypesLoaded,
    /// A writer lock was poisoned by a panicking save
    WriterPoisoned,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ReferenceCleared => "REFERENCE_CLEARED",
            Event::RivalDemoted => "RIVAL_DEMOTED",
            Event::DefaultFlagAssigned => "DEFAULT_FLAG_ASSIGNED",
            Event::AttachmentPromoted => "ATTACHMENT_PROMOTED",
            Event::AttachmentFailed => "ATTACHMENT_FAILED",
            Event::DestroyBlocked => "DESTROY_BLOCKED",
            Event::ValidationPassed => "VALIDATION_PASSED",
            Event::ValidationFailed => "VALIDATION_FAILED",
            Event::SaveRejected => "SAVE_REJECTED",
            Event::EffectsRolledBack => "EFFECTS_ROLLED_BACK",
            Event::RecordSaved => "RECORD_SAVED",
            Event::RecordDestroyed => "RECORD_DESTROYED",
            Event::RecordTypesLoaded => "RECORD_TYPES_LOADED",
            Event::WriterPoisoned => "WRITER_POISONED",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Event::ReferenceCleared
            | Event::RivalDemoted
            | Event::DestroyBlocked
            | Event::ValidationFailed
            | Event::EffectsRolledBack => Severity::Warn,
            Event::AttachmentFailed | Event::SaveRejected => Severity::Error,
            Event::WriterPoisoned => Severity::Fatal,
            Event::ValidationPassed => Severity::Trace,
            Event::DefaultFlagAssigned
            | Event::AttachmentPromoted
            | Event::RecordSaved
            | Event::RecordDestroyed
            | Event::RecordTypesLoaded => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
