//! Validation error collection
//!
//! The request validator records one [`ValidationError`] per failing rule, keyed by
//! the dotted path of the offending payload field (`filters.1.nested.0.value`).
//! A [`ValidationErrors`] collection serializes as a `{ path: [messages] }` map.
//!
//! # Example
//!
//! ```rust
//! use searchcrate::validation::{ValidationErrors, ValidationKind};
//!
//! let mut errors = ValidationErrors::new();
//! errors.add("sort.0.field", ValidationKind::NotAllowed, "The selected sort.0.field is invalid.");
//!
//! assert_eq!(errors.kind_of("sort.0.field"), Some(ValidationKind::NotAllowed));
//! assert!(errors.result().is_err());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    /// A required field is missing
    Required,
    /// The value has the wrong JSON shape (array, object, string...)
    Type,
    /// The name is not on the resource's whitelist
    NotAllowed,
    /// The operator exists but the filter does not permit it
    OperatorNotAllowed,
    /// The value does not satisfy the filter's value rules
    InvalidValue,
    /// A list value is empty
    EmptyList,
    /// The value is not one of a fixed set of choices
    InvalidChoice,
    /// The value does not have the expected textual form
    Format,
    /// The number is below its minimum
    TooSmall,
    /// The number is above its maximum
    TooLarge,
}

/// Validation error with field path, reason and message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Dotted path of the field that failed validation
    pub field: String,
    /// Machine-readable reason
    pub kind: ValidationKind,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, kind: ValidationKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Record a failure for `field`.
    pub fn add(&mut self, field: impl Into<String>, kind: ValidationKind, message: impl Into<String>) {
        self.errors.push(ValidationError::new(field, kind, message));
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Whether any error was recorded for exactly this path.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|error| error.field == field)
    }

    /// First reason recorded for `field`.
    #[must_use]
    pub fn kind_of(&self, field: &str) -> Option<ValidationKind> {
        self.errors.iter().find(|error| error.field == field).map(|error| error.kind)
    }

    /// Messages grouped by field path.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, Vec<String>> {
        let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for error in &self.errors {
            map.entry(error.field.clone()).or_default().push(error.message.clone());
        }
        map
    }

    /// Convert to Result
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Shape checks shared by the request validator
pub mod validators {
    use serde_json::Value;

    /// Filter field paths may only contain word characters, dots, dashes and `>`.
    #[must_use]
    pub fn is_field_path(value: &str) -> bool {
        !value.is_empty()
            && value
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '>'))
    }

    /// Booleans accept `true`, `false`, `0`, `1`, `"0"` and `"1"`.
    #[must_use]
    pub fn as_flexible_bool(value: &Value) -> Option<bool> {
        match value {
            Value::Bool(flag) => Some(*flag),
            Value::Number(n) => match n.as_u64() {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            Value::String(s) => match s.as_str() {
                "0" => Some(false),
                "1" => Some(true),
                _ => None,
            },
            _ => None,
        }
    }

    /// Integer value of a JSON number without a fractional part.
    #[must_use]
    pub fn as_integer(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Strings containing only whitespace count as absent.
    #[must_use]
    pub fn is_blank(value: &Value) -> bool {
        matches!(value, Value::String(s) if s.trim().is_empty())
    }

    #[must_use]
    pub fn describe(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        }
    }
}
