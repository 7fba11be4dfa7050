use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use utoipa::ToSchema;

use crate::errors::SearchError;
use crate::validation::validators::as_flexible_bool;

/// Body of a search request.
///
/// # Filters
/// `filters` is an ordered list of filter nodes. Adjacent nodes are joined by their
/// `type` (`and` by default); a node with `nested` wraps its children in parentheses:
/// ```json
/// [
///   {"field": "title", "operator": "like", "value": "%rust%"},
///   {"type": "or", "nested": [
///     {"field": "likes", "operator": ">", "value": 10},
///     {"field": "user.name", "operator": "in", "value": ["ann", "bob"]}
///   ]}
/// ]
/// ```
///
/// # Scopes
/// Named, resource-defined query transformations with optional positional parameters:
/// `[{"name": "publishedAt", "parameters": ["2019-01-01"]}]`
///
/// # Search
/// Substring match over the resource's searchable fields: `{"value": "rust"}`
///
/// # Sorting
/// `[{"field": "user.name", "direction": "desc"}]`
///
/// # Pagination
/// `{"size": 10, "number": 2}` (pages are 1-based)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, ToSchema)]
#[schema(example = json!({
    "scopes": [{"name": "publishedAt", "parameters": ["2019-01-01"]}],
    "filters": [{"field": "title", "operator": "like", "value": "%rust%"}],
    "search": {"value": "example"},
    "sort": [{"field": "title", "direction": "asc"}],
    "page": {"size": 10, "number": 1}
}))]
pub struct SearchRequest {
    #[serde(default)]
    pub scopes: Vec<ScopeDescriptor>,
    #[serde(default)]
    pub filters: Vec<FilterNode>,
    #[serde(default)]
    pub search: Option<SearchDescriptor>,
    #[serde(default)]
    pub sort: Vec<SortDescriptor>,
    #[serde(default)]
    pub page: Option<PageDescriptor>,
    /// Include soft-deleted rows
    #[serde(default, deserialize_with = "flexible_bool")]
    pub with_trashed: Option<bool>,
    /// Return only soft-deleted rows
    #[serde(default, deserialize_with = "flexible_bool")]
    pub only_trashed: Option<bool>,
}

impl SearchRequest {
    /// Decode a payload that already passed validation.
    pub fn from_value(payload: Value) -> Result<Self, SearchError> {
        serde_json::from_value(payload).map_err(SearchError::Malformed)
    }
}

/// How a filter node joins the node before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    #[default]
    And,
    Or,
}

/// A single comparison, or a parenthesized group of nodes when `nested` is set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct FilterNode {
    #[serde(default, rename = "type")]
    pub kind: FilterType,
    #[serde(default)]
    pub field: Option<String>,
    /// Defaults to `=`
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    #[schema(value_type = Option<Vec<Object>>)]
    pub nested: Option<Vec<FilterNode>>,
}

impl FilterNode {
    /// Leaf node comparing `field` with `value`.
    pub fn compare(field: impl Into<String>, operator: impl Into<String>, value: Value) -> Self {
        Self {
            field: Some(field.into()),
            operator: Some(operator.into()),
            value,
            ..Self::default()
        }
    }

    /// Group node wrapping `children` in parentheses.
    #[must_use]
    pub fn group(children: Vec<FilterNode>) -> Self {
        Self {
            nested: Some(children),
            ..Self::default()
        }
    }

    /// Join to the previous node with OR instead of AND.
    #[must_use]
    pub fn or(mut self) -> Self {
        self.kind = FilterType::Or;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct ScopeDescriptor {
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl From<SortDirection> for sea_orm::Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => sea_orm::Order::Asc,
            SortDirection::Desc => sea_orm::Order::Desc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct SortDescriptor {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct SearchDescriptor {
    #[serde(default)]
    pub value: Option<String>,
    /// Overrides the configured case sensitivity
    #[serde(default, deserialize_with = "flexible_bool")]
    pub case_sensitive: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct PageDescriptor {
    #[serde(default)]
    pub size: Option<u64>,
    /// 1-based page number
    #[serde(default)]
    pub number: Option<u64>,
}

/// One page of matching rows plus the total match count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults<M> {
    pub data: Vec<M>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

fn flexible_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    as_flexible_bool(&value)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("expected a boolean, got {value}")))
}
