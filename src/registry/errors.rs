//! Registry error types
//!
//! Error codes:
//! - MORSE_UNKNOWN_RECORD_TYPE (REJECT)
//! - MORSE_UNKNOWN_FIELD (REJECT)
//! - MORSE_FIELD_KIND_MISMATCH (REJECT)
//! - MORSE_RECORD_TYPE_IMMUTABLE (REJECT)
//! - MORSE_MALFORMED_DEFINITION (FATAL)

use std::fmt;

/// Severity levels for registry errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Request rejected, registry unchanged
    Reject,
    /// Definitions on disk are unusable; the host must not start
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Registry error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryErrorCode {
    /// Record type name not registered
    MorseUnknownRecordType,
    /// Rule refers to a field its record type does not declare
    MorseUnknownField,
    /// Rule applied to a field of an unsuitable kind
    MorseFieldKindMismatch,
    /// Attempt to redefine an existing record type
    MorseRecordTypeImmutable,
    /// Definition file unreadable or structurally invalid
    MorseMalformedDefinition,
}

impl RegistryErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            RegistryErrorCode::MorseUnknownRecordType => "MORSE_UNKNOWN_RECORD_TYPE",
            RegistryErrorCode::MorseUnknownField => "MORSE_UNKNOWN_FIELD",
            RegistryErrorCode::MorseFieldKindMismatch => "MORSE_FIELD_KIND_MISMATCH",
            RegistryErrorCode::MorseRecordTypeImmutable => "MORSE_RECORD_TYPE_IMMUTABLE",
            RegistryErrorCode::MorseMalformedDefinition => "MORSE_MALFORMED_DEFINITION",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            RegistryErrorCode::MorseMalformedDefinition => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for RegistryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Registry error with context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryError {
    code: RegistryErrorCode,
    message: String,
    record_type: Option<String>,
    field: Option<String>,
}

impl RegistryError {
    pub fn unknown_record_type(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            code: RegistryErrorCode::MorseUnknownRecordType,
            message: format!("Record type '{}' is not registered", name),
            record_type: Some(name),
            field: None,
        }
    }

    pub fn unknown_field(record_type: impl Into<String>, field: impl Into<String>) -> Self {
        let record_type = record_type.into();
        let field = field.into();
        Self {
            code: RegistryErrorCode::MorseUnknownField,
            message: format!("Record type '{}' does not declare field '{}'", record_type, field),
            record_type: Some(record_type),
            field: Some(field),
        }
    }

    pub fn kind_mismatch(
        record_type: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        let record_type = record_type.into();
        let field = field.into();
        Self {
            code: RegistryErrorCode::MorseFieldKindMismatch,
            message: format!(
                "Field '{}.{}' must be {}, declared as {}",
                record_type,
                field,
                expected.into(),
                actual.into()
            ),
            record_type: Some(record_type),
            field: Some(field),
        }
    }

    pub fn immutable(record_type: impl Into<String>) -> Self {
        let record_type = record_type.into();
        Self {
            code: RegistryErrorCode::MorseRecordTypeImmutable,
            message: format!("Record type '{}' is already defined", record_type),
            record_type: Some(record_type),
            field: None,
        }
    }

    pub fn malformed(source: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: RegistryErrorCode::MorseMalformedDefinition,
            message: format!("Malformed definition '{}': {}", source.into(), reason.into()),
            record_type: None,
            field: None,
        }
    }

    pub fn code(&self) -> RegistryErrorCode {
        self.code
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn record_type(&self) -> Option<&str> {
        self.record_type.as_deref()
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for RegistryError {}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(RegistryErrorCode::MorseUnknownRecordType.code(), "MORSE_UNKNOWN_RECORD_TYPE");
        assert_eq!(RegistryErrorCode::MorseUnknownField.code(), "MORSE_UNKNOWN_FIELD");
        assert_eq!(RegistryErrorCode::MorseFieldKindMismatch.code(), "MORSE_FIELD_KIND_MISMATCH");
        assert_eq!(RegistryErrorCode::MorseRecordTypeImmutable.code(), "MORSE_RECORD_TYPE_IMMUTABLE");
        assert_eq!(RegistryErrorCode::MorseMalformedDefinition.code(), "MORSE_MALFORMED_DEFINITION");
    }

    #[test]
    fn test_only_malformed_is_fatal() {
        assert!(RegistryError::malformed("land.json", "bad json").is_fatal());
        assert!(!RegistryError::unknown_record_type("land").is_fatal());
    }

    #[test]
    fn test_display_includes_code_and_context() {
        let err = RegistryError::unknown_field("land", "colour");
        let display = err.to_string();
        assert!(display.contains("REJECT"));
        assert!(display.contains("MORSE_UNKNOWN_FIELD"));
        assert!(display.contains("colour"));
        assert_eq!(err.field(), Some("colour"));
    }
}
