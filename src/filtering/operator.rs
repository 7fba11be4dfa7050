//! Comparison operators accepted in filter descriptors.

use std::fmt;
use std::str::FromStr;

/// Comparison operators for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equality (=)
    Eq,
    /// Not equal (!=)
    Ne,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Gte,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Lte,
    /// LIKE pattern matching
    Like,
    /// NOT LIKE pattern matching
    NotLike,
    /// Case-insensitive LIKE
    ILike,
    /// Case-insensitive NOT LIKE
    NotILike,
    /// IN (array of values)
    In,
    /// NOT IN (array of values)
    NotIn,
    /// JSON column contains every listed value
    AllIn,
    /// JSON column contains at least one listed value
    AnyIn,
}

impl Operator {
    pub const ALL: [Self; 14] = [
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::Eq,
        Self::Ne,
        Self::Like,
        Self::NotLike,
        Self::ILike,
        Self::NotILike,
        Self::In,
        Self::NotIn,
        Self::AllIn,
        Self::AnyIn,
    ];

    /// Operators every string filter accepts.
    pub const STRING: [Self; 10] = [
        Self::Eq,
        Self::Ne,
        Self::In,
        Self::NotIn,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::Like,
        Self::NotLike,
    ];

    /// Operators number and timestamp filters accept.
    pub const ORDERED: [Self; 8] = [
        Self::Eq,
        Self::Ne,
        Self::In,
        Self::NotIn,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
    ];

    /// Operators for JSON array columns.
    pub const JSON: [Self; 2] = [Self::AllIn, Self::AnyIn];

    /// Parse the wire spelling of an operator.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == raw)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Like => "like",
            Self::NotLike => "not like",
            Self::ILike => "ilike",
            Self::NotILike => "not ilike",
            Self::In => "in",
            Self::NotIn => "not in",
            Self::AllIn => "all in",
            Self::AnyIn => "any in",
        }
    }

    /// `in` and `not in` take a list of values.
    #[must_use]
    pub fn is_membership(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }

    /// `all in` and `any in` test containment in a JSON array column.
    #[must_use]
    pub fn is_json_containment(self) -> bool {
        matches!(self, Self::AllIn | Self::AnyIn)
    }

    #[must_use]
    pub fn is_pattern(self) -> bool {
        matches!(self, Self::Like | Self::NotLike | Self::ILike | Self::NotILike)
    }

    /// Operators that exclude rows matching their operand.
    #[must_use]
    pub fn is_negated(self) -> bool {
        matches!(self, Self::Ne | Self::NotLike | Self::NotILike | Self::NotIn)
    }

    /// The non-negated counterpart (`!=` becomes `=`, `not in` becomes `in`).
    #[must_use]
    pub fn positive(self) -> Self {
        match self {
            Self::Ne => Self::Eq,
            Self::NotLike => Self::Like,
            Self::NotILike => Self::ILike,
            Self::NotIn => Self::In,
            other => other,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl fmt::Display for UnknownOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operator '{}'", self.0)
    }
}

impl std::error::Error for UnknownOperator {}

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownOperator(s.to_string()))
    }
}
