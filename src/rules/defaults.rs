use crate::record::{Accessor, Record, Value};
use crate::validation::RuleOutcome;

/// Sets `field` to `default` when it is falsy (null or `false`).
///
/// `0` is truthy and stays.
pub fn integer_or_default(record: &mut Record, field: &str, default: i64) -> RuleOutcome {
    if !record.get(field).is_truthy() {
        record.set(field, Value::Int(default));
    }
    RuleOutcome::valid()
}
