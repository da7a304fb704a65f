//! Destructive guard
//!
//! Advisory to the destroy lifecycle: the rule only records why a record
//! must survive, the pipeline decides not to delete it.

use crate::record::{Accessor, Record, Value};
use crate::validation::RuleOutcome;

/// Blocks destruction while `field` is `true` or a non-empty collection.
pub fn survive_if(record: &mut Record, field: &str) -> RuleOutcome {
    let message = match record.get(field) {
        Value::Bool(true) => format!("Cannot destroy while {} is true", field),
        Value::List(members) if !members.is_empty() => {
            format!("Cannot destroy while {} has members", field)
        }
        _ => return RuleOutcome::valid(),
    };

    record.errors_mut().add_to_base(message);
    RuleOutcome::invalid()
}
