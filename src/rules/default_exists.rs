use super::RuleContext;
use crate::observability::Event;
use crate::record::{Accessor, Record, Value};
use crate::store::StoreResult;
use crate::validation::RuleOutcome;

/// "There must be one": when no stored record of this type holds `field`,
/// the current record claims it.
///
/// Nothing is persisted here; the claim rides along with the record's own
/// save. When a holder already exists the current value is left as is,
/// `true` included.
pub fn there_must_be_one(
    record: &mut Record,
    field: &str,
    ctx: &RuleContext<'_>,
) -> StoreResult<RuleOutcome> {
    let holders = ctx.store.find_where(record.kind(), field, &Value::Bool(true))?;

    if holders.is_empty() {
        record.set(field, Value::Bool(true));
        ctx.observer.emit(
            Event::DefaultFlagAssigned,
            &[("record_type", record.kind()), ("field", field)],
        );
    }

    Ok(RuleOutcome::valid())
}
