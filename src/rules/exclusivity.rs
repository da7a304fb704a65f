//! "There can be only one"
//!
//! Runs before a record is persisted and demotes every rival that holds the
//! flag. The record's own flag is left alone: the caller has set it, or is
//! about to.
//!
//! This is cooperative. Two concurrent saves can both see zero rivals; hosts
//! serialize writes per record type (the pipeline does by default) or add a
//! storage-level constraint.

use super::RuleContext;
use crate::observability::Event;
use crate::record::{Accessor, Record, Value};
use crate::store::StoreResult;
use crate::validation::RuleOutcome;

/// Queues every other `true`-flagged record of the same type for demotion.
///
/// A new record has no id, so every flagged record is a rival; a persisted
/// one excludes itself.
pub fn there_can_be_only_one(
    record: &Record,
    field: &str,
    ctx: &RuleContext<'_>,
) -> StoreResult<RuleOutcome> {
    let holders = ctx.store.find_where(record.kind(), field, &Value::Bool(true))?;

    let mut outcome = RuleOutcome::valid();
    for mut rival in holders {
        if record.id().is_some() && rival.id() == record.id() {
            continue;
        }

        rival.set(field, Value::Bool(false));
        let rival_id = rival.id().map(|id| id.to_string()).unwrap_or_default();
        ctx.observer.emit(
            Event::RivalDemoted,
            &[("record_type", record.kind()), ("field", field), ("rival", &rival_id)],
        );
        outcome.persist(rival);
    }

    Ok(outcome)
}
