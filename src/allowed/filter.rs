use serde_json::Value;

use super::rules::{self, ValueRule};
use super::{Aliasable, DescriptorKind};
use crate::filtering::Operator;

/// A filter a resource exposes: which operators it takes and what values are valid.
///
/// ```rust
/// use searchcrate::{Aliasable, AllowedFilter, Operator};
///
/// let filter = AllowedFilter::string("myTitleAlias").mapped_to("title");
/// assert_eq!(filter.internal_name(), "title");
/// assert!(filter.allows(Operator::Like));
/// assert!(!AllowedFilter::number("likes").allows(Operator::Like));
/// ```
#[derive(Debug, Clone)]
pub struct AllowedFilter {
    name: String,
    internal_name: String,
    operators: Vec<Operator>,
    rules: Vec<ValueRule>,
}

impl AllowedFilter {
    /// # Panics
    ///
    /// Panics if `name` is empty.
    pub fn new(
        name: impl Into<String>,
        operators: impl IntoIterator<Item = Operator>,
        rules: Vec<ValueRule>,
    ) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "allowed filter name must not be empty");
        Self {
            internal_name: name.clone(),
            name,
            operators: operators.into_iter().collect(),
            rules,
        }
    }

    /// Text column: equality, ordering, membership and `like` patterns.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, Operator::STRING, vec![ValueRule::Nullable, ValueRule::String])
    }

    /// Numeric column: equality, ordering and membership.
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, Operator::ORDERED, vec![ValueRule::Nullable, ValueRule::Numeric])
    }

    /// Date or date-time column: equality, ordering and membership on absolute dates.
    pub fn timestamp(name: impl Into<String>) -> Self {
        Self::new(name, Operator::ORDERED, vec![ValueRule::Nullable, ValueRule::Date])
    }

    /// JSON array column: `all in` and `any in` containment.
    pub fn json(name: impl Into<String>) -> Self {
        Self::new(name, Operator::JSON, vec![ValueRule::Nullable, ValueRule::Scalar])
    }

    /// Compile against `internal` instead of the external name.
    ///
    /// # Panics
    ///
    /// Panics if `internal` is empty.
    #[must_use]
    pub fn mapped_to(mut self, internal: impl Into<String>) -> Self {
        let internal = internal.into();
        assert!(!internal.is_empty(), "allowed filter internal name must not be empty");
        self.internal_name = internal;
        self
    }

    #[must_use]
    pub fn allowed_operators(&self) -> &[Operator] {
        &self.operators
    }

    #[must_use]
    pub fn allows(&self, operator: Operator) -> bool {
        self.operators.contains(&operator)
    }

    #[must_use]
    pub fn value_rules(&self) -> &[ValueRule] {
        &self.rules
    }

    /// Check a single value (or one list element) against the value rules.
    pub fn check_value(&self, value: &Value, attribute: &str) -> Result<(), String> {
        rules::check(&self.rules, value, attribute)
    }
}

impl Aliasable for AllowedFilter {
    const KIND: DescriptorKind = DescriptorKind::Filter;

    fn name(&self) -> &str {
        &self.name
    }

    fn internal_name(&self) -> &str {
        &self.internal_name
    }
}
