//! Value rules applied to filter values.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::validation::validators::{describe, is_blank};

type Check = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A constraint on a single filter value.
///
/// Rules are checked together by [`check`]: `null` is accepted only when the set
/// contains [`ValueRule::Nullable`], blank strings skip every rule, and any other
/// value must satisfy each remaining rule.
#[derive(Clone)]
pub enum ValueRule {
    Nullable,
    String,
    /// JSON number (numeric strings are rejected)
    Numeric,
    Integer,
    Boolean,
    /// Date or date-time string
    Date,
    /// Any non-container JSON value
    Scalar,
    OneOf(Vec<Value>),
    Custom { name: &'static str, check: Check },
}

impl ValueRule {
    /// Rule backed by a predicate. `name` appears in error messages.
    pub fn custom(name: &'static str, check: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom {
            name,
            check: Arc::new(check),
        }
    }

    #[must_use]
    pub fn passes(&self, value: &Value) -> bool {
        match self {
            Self::Nullable => value.is_null(),
            Self::String => value.is_string(),
            Self::Numeric => value.is_number(),
            Self::Integer => value.as_i64().is_some() || value.as_u64().is_some(),
            Self::Boolean => value.is_boolean(),
            Self::Date => value.as_str().and_then(parse_timestamp).is_some(),
            Self::Scalar => !value.is_array() && !value.is_object(),
            Self::OneOf(choices) => choices.contains(value),
            Self::Custom { check, .. } => check(value),
        }
    }

    #[must_use]
    pub fn message(&self, attribute: &str) -> String {
        match self {
            Self::Nullable => format!("The {attribute} must be null."),
            Self::String => format!("The {attribute} must be a string."),
            Self::Numeric => format!("The {attribute} must be a number."),
            Self::Integer => format!("The {attribute} must be an integer."),
            Self::Boolean => format!("The {attribute} field must be true or false."),
            Self::Date => format!("The {attribute} is not a valid date."),
            Self::Scalar => format!("The {attribute} must be a single value."),
            Self::OneOf(_) => format!("The selected {attribute} is invalid."),
            Self::Custom { name, .. } => format!("The {attribute} must be a valid {name}."),
        }
    }
}

impl fmt::Debug for ValueRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nullable => f.write_str("Nullable"),
            Self::String => f.write_str("String"),
            Self::Numeric => f.write_str("Numeric"),
            Self::Integer => f.write_str("Integer"),
            Self::Boolean => f.write_str("Boolean"),
            Self::Date => f.write_str("Date"),
            Self::Scalar => f.write_str("Scalar"),
            Self::OneOf(choices) => f.debug_tuple("OneOf").field(choices).finish(),
            Self::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish_non_exhaustive(),
        }
    }
}

/// Apply a rule set to one value, returning the first failure message.
pub fn check(rules: &[ValueRule], value: &Value, attribute: &str) -> Result<(), String> {
    if value.is_null() {
        return if rules.iter().any(|rule| matches!(rule, ValueRule::Nullable)) {
            Ok(())
        } else {
            Err(format!("The {attribute} must not be null."))
        };
    }
    if is_blank(value) {
        return Ok(());
    }
    match rules
        .iter()
        .filter(|rule| !matches!(rule, ValueRule::Nullable))
        .find(|rule| !rule.passes(value))
    {
        Some(rule) => {
            tracing::trace!(attribute, got = describe(value), rule = ?rule, "value rule failed");
            Err(rule.message(attribute))
        }
        None => Ok(()),
    }
}

const DATE_TIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an absolute date or date-time. Relative words and epoch numbers are not dates.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.naive_local());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// The calendar day of a timestamp that falls exactly on midnight.
#[must_use]
pub fn midnight_date(raw: &str) -> Option<NaiveDate> {
    let timestamp = parse_timestamp(raw)?;
    (timestamp.time() == chrono::NaiveTime::MIN).then(|| timestamp.date())
}
