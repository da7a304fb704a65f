//! Error collection attached to a record during a validation pass

use std::fmt;

/// Sentinel field for whole-record errors
pub const BASE: &str = "base";

/// Ordered, per-field multiset of validation messages.
///
/// Fields keep the order in which they first received a message and each
/// field keeps its messages in insertion order. Duplicates are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorCollection {
    entries: Vec<(String, Vec<String>)>,
}

impl ErrorCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `message` under `field`
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((field, vec![message])),
        }
    }

    /// Append a whole-record message
    pub fn add_to_base(&mut self, message: impl Into<String>) {
        self.add(BASE, message);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of messages across all fields
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, m)| m.len()).sum()
    }

    /// Messages recorded for `field`, in insertion order
    pub fn messages_for(&self, field: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries.iter().any(|(f, _)| f == field)
    }

    /// Fields carrying at least one message
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(f, _)| f.as_str())
    }

    /// `(field, message)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(f, messages)| messages.iter().map(move |m| (f.as_str(), m.as_str())))
    }

    /// Drop everything; called at the start of every pass
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// User-facing sentences: `"Default land does not exist"`, or the bare
    /// message for base errors.
    pub fn full_messages(&self) -> Vec<String> {
        self.iter()
            .map(|(field, message)| {
                if field == BASE {
                    message.to_string()
                } else {
                    format!("{} {}", humanize(field), message)
                }
            })
            .collect()
    }
}

impl fmt::Display for ErrorCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_messages().join(", "))
    }
}

/// `default_land_id` -> `Default land`
fn humanize(field: &str) -> String {
    let trimmed = field.strip_suffix("_id").unwrap_or(field);
    let spaced = trimmed.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
