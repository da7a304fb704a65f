//! Rule outcomes
//!
//! A rule never writes to the store behind the pipeline's back. Writes to
//! records other than the one being validated are returned as effects and
//! applied by the pipeline as soon as the rule returns.

use crate::record::Record;

/// Whether a rule found the record acceptable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid,
}

/// A write the pipeline must perform on behalf of a rule
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Persist this (already modified) collaborator record
    Persist(Record),
}

/// Verdict plus side effects of one rule invocation
#[derive(Debug, Clone, PartialEq)]
pub struct RuleOutcome {
    verdict: Verdict,
    effects: Vec<Effect>,
}

impl RuleOutcome {
    pub fn valid() -> Self {
        Self {
            verdict: Verdict::Valid,
            effects: Vec::new(),
        }
    }

    pub fn invalid() -> Self {
        Self {
            verdict: Verdict::Invalid,
            effects: Vec::new(),
        }
    }

    /// Queue a collaborator record for persistence
    pub fn persist(&mut self, record: Record) {
        self.effects.push(Effect::Persist(record));
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn is_valid(&self) -> bool {
        self.verdict == Verdict::Valid
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn into_effects(self) -> Vec<Effect> {
        self.effects
    }
}

impl Default for RuleOutcome {
    fn default() -> Self {
        Self::valid()
    }
}
