//! Rule and pipeline counters
//!
//! Counters only, monotonic, starting at zero with each [`RuleMetrics`].
//! Every counter is driven by an [`Event`], so what is counted and what is
//! logged cannot drift apart.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::Event;

#[derive(Debug, Default)]
pub struct RuleMetrics {
    references_cleared: AtomicU64,
    rivals_demoted: AtomicU64,
    defaults_assigned: AtomicU64,
    attachments_promoted: AtomicU64,
    attachments_failed: AtomicU64,
    destroys_blocked: AtomicU64,
    validations_passed: AtomicU64,
    validations_failed: AtomicU64,
    saves_rejected: AtomicU64,
    effects_rolled_back: AtomicU64,
    saves: AtomicU64,
    destroys: AtomicU64,
    record_types_loaded: AtomicU64,
    writers_poisoned: AtomicU64,
}

impl RuleMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `event`
    pub fn observe(&self, event: Event) {
        self.counter(event).fetch_add(1, Ordering::Relaxed);
    }

    /// Count `n` occurrences at once (e.g. types loaded from a directory)
    pub fn observe_n(&self, event: Event, n: u64) {
        self.counter(event).fetch_add(n, Ordering::Relaxed);
    }

    fn counter(&self, event: Event) -> &AtomicU64 {
        match event {
            Event::ReferenceCleared => &self.references_cleared,
            Event::RivalDemoted => &self.rivals_demoted,
            Event::DefaultFlagAssigned => &self.defaults_assigned,
            Event::AttachmentPromoted => &self.attachments_promoted,
            Event::AttachmentFailed => &self.attachments_failed,
            Event::DestroyBlocked => &self.destroys_blocked,
            Event::ValidationPassed => &self.validations_passed,
            Event::ValidationFailed => &self.validations_failed,
            Event::SaveRejected => &self.saves_rejected,
            Event::EffectsRolledBack => &self.effects_rolled_back,
            Event::RecordSaved => &self.saves,
            Event::RecordDestroyed => &self.destroys,
            Event::RecordTypesLoaded => &self.record_types_loaded,
            Event::WriterPoisoned => &self.writers_poisoned,
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        MetricsSnapshot {
            references_cleared: load(&self.references_cleared),
            rivals_demoted: load(&self.rivals_demoted),
            defaults_assigned: load(&self.defaults_assigned),
            attachments_promoted: load(&self.attachments_promoted),
            attachments_failed: load(&self.attachments_failed),
            destroys_blocked: load(&self.destroys_blocked),
            validations_passed: load(&self.validations_passed),
            validations_failed: load(&self.validations_failed),
            saves_rejected: load(&self.saves_rejected),
            effects_rolled_back: load(&self.effects_rolled_back),
            saves: load(&self.saves),
            destroys: load(&self.destroys),
            record_types_loaded: load(&self.record_types_loaded),
            writers_poisoned: load(&self.writers_poisoned),
        }
    }
}

/// Point-in-time copy of every counter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub references_cleared: u64,
    pub rivals_demoted: u64,
    pub defaults_assigned: u64,
    pub attachments_promoted: u64,
    pub attachments_failed: u64,
    pub destroys_blocked: u64,
    pub validations_passed: u64,
    pub validations_failed: u64,
    pub saves_rejected: u64,
    pub effects_rolled_back: u64,
    pub saves: u64,
    pub destroys: u64,
    pub record_types_loaded: u64,
    pub writers_poisoned: u64,
}

impl MetricsSnapshot {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
