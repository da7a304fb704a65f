//! Foreign-key existence
//!
//! A reference that does not resolve is cleared to null on the spot, whether
//! or not the association is required. Later rules rely on a dangling
//! reference reading as absent.

use super::{RuleContext, DOES_NOT_EXIST};
use crate::observability::Event;
use crate::record::{Accessor, Record, Value};
use crate::store::StoreResult;
use crate::validation::RuleOutcome;

/// Checks that `field` references an existing `target` record.
///
/// Non-reference values (a stray string, say) never resolve and are cleared
/// like any other dangling key.
pub fn associated_exists(
    record: &mut Record,
    field: &str,
    target: &str,
    required: bool,
    ctx: &RuleContext<'_>,
) -> StoreResult<RuleOutcome> {
    let resolved = match record.get(field).as_record_id() {
        Some(id) => ctx.store.find_by_id(target, id)?.is_some(),
        None => false,
    };

    if !resolved && !record.get(field).is_null() {
        record.set(field, Value::Null);
        ctx.observer.emit(
            Event::ReferenceCleared,
            &[("record_type", record.kind()), ("field", field), ("target", target)],
        );
    }

    if !resolved && required {
        record.errors_mut().add(field, DOES_NOT_EXIST);
        return Ok(RuleOutcome::invalid());
    }

    Ok(RuleOutcome::valid())
}
