use crate::record::{Accessor, Record};
use crate::validation::RuleOutcome;

/// Adds `message` under `field` unless the value is exactly `true`.
///
/// Unlike a presence check, `false` and null are rejected alike.
pub fn mandatory_boolean(record: &mut Record, field: &str, message: &str) -> RuleOutcome {
    if record.get(field).is_true() {
        return RuleOutcome::valid();
    }
    record.errors_mut().add(field, message);
    RuleOutcome::invalid()
}
