//! Accessor protocol: uniform, name-keyed attribute access.
//!
//! Rules never see a concrete record layout; they read and write attributes
//! by field name through this trait.

use super::value::Value;

/// Name-keyed attribute access
pub trait Accessor {
    /// Current value of `field`; undeclared fields read as null
    fn get(&self, field: &str) -> &Value;

    /// Overwrite `field`; undeclared fields are left alone
    fn set(&mut self, field: &str, value: Value);

    /// Whether the record's type declares `field`
    fn responds_to(&self, field: &str) -> bool;
}
