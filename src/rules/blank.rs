use crate::record::{Accessor, Record, Value};
use crate::validation::RuleOutcome;

/// Rewrites a blank `field` (empty string, empty collection, null) to null.
///
/// Pure normalization: never adds an error, idempotent.
pub fn blank_to_nil(record: &mut Record, field: &str) -> RuleOutcome {
    if record.get(field).is_blank() {
        record.set(field, Value::Null);
    }
    RuleOutcome::valid()
}
