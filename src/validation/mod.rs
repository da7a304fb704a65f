//! Validation results: the per-record error collection and the outcome type
//! every rule returns.

mod collection;
mod outcome;

pub use collection::{ErrorCollection, BASE};
pub use outcome::{Effect, RuleOutcome, Verdict};
