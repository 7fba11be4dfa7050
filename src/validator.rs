//! Structural validation of raw search payloads.
//!
//! The validator runs against the untyped JSON body so that every problem can be
//! reported at its exact path (`filters.1.nested.0.value.2`) instead of failing on the
//! first serde error. The nesting-depth ceiling is enforced before anything else.

use serde_json::{Map, Value};

use crate::allowed::{AllowedFilter, Aliasable};
use crate::config::SearchConfig;
use crate::errors::SearchError;
use crate::filtering::Operator;
use crate::models::SearchRequest;
use crate::resource::ResourceDefinition;
use crate::validation::validators::{as_flexible_bool, as_integer, is_field_path};
use crate::validation::{ValidationErrors, ValidationKind};

fn levels(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(levels).max().unwrap_or(0),
        Value::Object(fields) => 1 + fields.values().map(levels).max().unwrap_or(0),
        _ => 0,
    }
}

/// Container levels below `value`, counting every array and object.
#[must_use]
pub fn observed_depth(value: &Value) -> usize {
    levels(value).saturating_sub(1)
}

/// Nesting depth of a `filters` value. Each `nested` group adds an object and an
/// array level, so the observed depth is halved.
#[must_use]
pub fn nesting_depth(filters: &Value) -> usize {
    observed_depth(filters) / 2
}

pub struct SearchRequestValidator<'a> {
    config: &'a SearchConfig,
    definition: &'a ResourceDefinition,
}

impl<'a> SearchRequestValidator<'a> {
    #[must_use]
    pub fn new(config: &'a SearchConfig, definition: &'a ResourceDefinition) -> Self {
        Self { config, definition }
    }

    /// Validate and decode `payload`.
    pub fn validated(&self, payload: &Value) -> Result<SearchRequest, SearchError> {
        self.validate(payload)?;
        SearchRequest::from_value(payload.clone())
    }

    pub fn validate(&self, payload: &Value) -> Result<(), SearchError> {
        let mut errors = ValidationErrors::new();
        let Some(body) = payload.as_object() else {
            errors.add("payload", ValidationKind::Type, "The payload must be an object.");
            return Err(SearchError::Validation(errors));
        };

        if let Some(filters) = body.get("filters") {
            let depth = nesting_depth(filters);
            if depth > self.config.max_nested_depth {
                tracing::debug!(resource = %self.definition.name(), depth, max = self.config.max_nested_depth, "filter tree too deep");
                return Err(SearchError::NestedDepthExceeded {
                    depth,
                    max: self.config.max_nested_depth,
                });
            }
        }

        if let Some(scopes) = body.get("scopes") {
            self.check_scopes(scopes, &mut errors);
        }
        if let Some(filters) = body.get("filters") {
            self.check_filters(filters, "filters", &mut errors);
        }
        self.check_search(body, &mut errors);
        if let Some(sorts) = body.get("sort") {
            self.check_sorts(sorts, &mut errors);
        }
        self.check_page(body, &mut errors);
        for flag in ["with_trashed", "only_trashed"] {
            check_flag(body, flag, flag, &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            tracing::debug!(resource = %self.definition.name(), errors = errors.len(), "search request rejected");
            Err(SearchError::Validation(errors))
        }
    }

    fn check_scopes(&self, scopes: &Value, errors: &mut ValidationErrors) {
        let Some(scopes) = scopes.as_array() else {
            errors.add("scopes", ValidationKind::Type, "The scopes must be an array.");
            return;
        };
        for (index, scope) in scopes.iter().enumerate() {
            let path = format!("scopes.{index}");
            let Some(scope) = scope.as_object() else {
                errors.add(&path, ValidationKind::Type, format!("The {path} must be an object."));
                continue;
            };
            match scope.get("name") {
                None | Some(Value::Null) => {
                    errors.add(format!("{path}.name"), ValidationKind::Required, format!("The {path}.name field is required."));
                }
                Some(Value::String(name)) => {
                    if !self.definition.scopes().contains(name) {
                        errors.add(format!("{path}.name"), ValidationKind::NotAllowed, format!("The selected {path}.name is invalid."));
                    }
                }
                Some(_) => errors.add(format!("{path}.name"), ValidationKind::Type, format!("The {path}.name must be a string.")),
            }
            if scope.get("parameters").is_some_and(|p| !p.is_array()) {
                errors.add(format!("{path}.parameters"), ValidationKind::Type, format!("The {path}.parameters must be an array."));
            }
        }
    }

    fn check_filters(&self, filters: &Value, path: &str, errors: &mut ValidationErrors) {
        let Some(nodes) = filters.as_array() else {
            errors.add(path, ValidationKind::Type, format!("The {path} must be an array."));
            return;
        };
        for (index, node) in nodes.iter().enumerate() {
            self.check_filter_node(node, &format!("{path}.{index}"), errors);
        }
    }

    fn check_filter_node(&self, node: &Value, path: &str, errors: &mut ValidationErrors) {
        let Some(node) = node.as_object() else {
            errors.add(path, ValidationKind::Type, format!("The {path} must be an object."));
            return;
        };

        if let Some(kind) = node.get("type") {
            if !matches!(kind.as_str(), Some("and" | "or")) {
                errors.add(format!("{path}.type"), ValidationKind::InvalidChoice, format!("The selected {path}.type is invalid."));
            }
        }

        let nested = present(node, "nested");
        let filter = match present(node, "field") {
            None => {
                if nested.is_none() {
                    errors.add(
                        format!("{path}.field"),
                        ValidationKind::Required,
                        format!("The {path}.field field is required when {path}.nested is not present."),
                    );
                }
                None
            }
            Some(Value::String(name)) if !is_field_path(name) => {
                errors.add(format!("{path}.field"), ValidationKind::Format, format!("The {path}.field format is invalid."));
                None
            }
            Some(Value::String(name)) => {
                let filter = self.definition.filters().get(name);
                if filter.is_none() {
                    errors.add(format!("{path}.field"), ValidationKind::NotAllowed, format!("The selected {path}.field is invalid."));
                }
                filter
            }
            Some(_) => {
                errors.add(format!("{path}.field"), ValidationKind::Type, format!("The {path}.field must be a string."));
                None
            }
        };

        let operator = match present(node, "operator") {
            None => Some(Operator::Eq),
            Some(Value::String(raw)) => {
                let operator = Operator::parse(raw);
                if operator.is_none() {
                    errors.add(format!("{path}.operator"), ValidationKind::InvalidChoice, format!("The selected {path}.operator is invalid."));
                }
                operator
            }
            Some(_) => {
                errors.add(format!("{path}.operator"), ValidationKind::Type, format!("The {path}.operator must be a string."));
                None
            }
        };

        if let (Some(filter), Some(operator)) = (filter, operator) {
            if filter.allows(operator) {
                let value = node.get("value").unwrap_or(&Value::Null);
                check_value(filter, operator, value, &format!("{path}.value"), errors);
            } else {
                errors.add(
                    format!("{path}.operator"),
                    ValidationKind::OperatorNotAllowed,
                    format!("The operator '{operator}' is not allowed for field '{}'.", filter.name()),
                );
            }
        }

        if let Some(nested) = nested {
            self.check_filters(nested, &format!("{path}.nested"), errors);
        }
    }

    fn check_search(&self, body: &Map<String, Value>, errors: &mut ValidationErrors) {
        let search = match present(body, "search") {
            None => return,
            Some(Value::Object(search)) => search,
            Some(_) => {
                errors.add("search", ValidationKind::Type, "The search must be an object.");
                return;
            }
        };
        if present(search, "value").is_some_and(|value| !value.is_string()) {
            errors.add("search.value", ValidationKind::Type, "The search.value must be a string.");
        }
        check_flag(search, "case_sensitive", "search.case_sensitive", errors);
    }

    fn check_sorts(&self, sorts: &Value, errors: &mut ValidationErrors) {
        let Some(sorts) = sorts.as_array() else {
            errors.add("sort", ValidationKind::Type, "The sort must be an array.");
            return;
        };
        for (index, sort) in sorts.iter().enumerate() {
            let path = format!("sort.{index}");
            let Some(sort) = sort.as_object() else {
                errors.add(&path, ValidationKind::Type, format!("The {path} must be an object."));
                continue;
            };
            match present(sort, "field") {
                None => errors.add(format!("{path}.field"), ValidationKind::Required, format!("The {path}.field field is required.")),
                Some(Value::String(field)) => {
                    if !self.definition.sorts().contains(field) {
                        errors.add(format!("{path}.field"), ValidationKind::NotAllowed, format!("The selected {path}.field is invalid."));
                    }
                }
                Some(_) => errors.add(format!("{path}.field"), ValidationKind::Type, format!("The {path}.field must be a string.")),
            }
            if let Some(direction) = sort.get("direction") {
                if !matches!(direction.as_str(), Some("asc" | "desc")) {
                    errors.add(
                        format!("{path}.direction"),
                        ValidationKind::InvalidChoice,
                        format!("The selected {path}.direction is invalid."),
                    );
                }
            }
        }
    }

    fn check_page(&self, body: &Map<String, Value>, errors: &mut ValidationErrors) {
        let page = match present(body, "page") {
            None => return,
            Some(Value::Object(page)) => page,
            Some(_) => {
                errors.add("page", ValidationKind::Type, "The page must be an object.");
                return;
            }
        };
        check_positive(page, "size", Some(self.config.max_page_size), errors);
        let size = present(page, "size")
            .and_then(as_integer)
            .and_then(|n| u64::try_from(n).ok());
        check_positive(page, "number", Some(max_page_number(self.config.page_size(size))), errors);
    }
}

/// Highest page number whose row offset still fits a signed 64-bit integer.
fn max_page_number(size: u64) -> u64 {
    i64::MAX.unsigned_abs() / size.max(1) + 1
}

/// A key counts as present when it is set to anything but `null`.
fn present<'v>(object: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    object.get(key).filter(|value| !value.is_null())
}

fn check_flag(object: &Map<String, Value>, key: &str, path: &str, errors: &mut ValidationErrors) {
    if present(object, key).is_some_and(|value| as_flexible_bool(value).is_none()) {
        errors.add(path, ValidationKind::Type, format!("The {path} field must be true or false."));
    }
}

fn check_positive(page: &Map<String, Value>, key: &str, max: Option<u64>, errors: &mut ValidationErrors) {
    let Some(raw) = present(page, key) else {
        return;
    };
    let path = format!("page.{key}");
    match as_integer(raw) {
        None => errors.add(&path, ValidationKind::Type, format!("The {path} must be an integer.")),
        Some(n) if n < 1 => errors.add(&path, ValidationKind::TooSmall, format!("The {path} must be at least 1.")),
        Some(n) => {
            if let Some(max) = max.filter(|max| n.unsigned_abs() > *max) {
                errors.add(&path, ValidationKind::TooLarge, format!("The {path} must not be greater than {max}."));
            }
        }
    }
}

fn check_value(filter: &AllowedFilter, operator: Operator, value: &Value, path: &str, errors: &mut ValidationErrors) {
    match value {
        Value::Array(items) if operator.is_membership() || operator.is_json_containment() => {
            if items.is_empty() {
                errors.add(path, ValidationKind::EmptyList, format!("The {path} must contain at least one value."));
            }
            for (index, item) in items.iter().enumerate() {
                check_single(filter, item, &format!("{path}.{index}"), errors);
            }
        }
        _ if operator.is_membership() => {
            errors.add(path, ValidationKind::Type, format!("The {path} must be an array."));
        }
        _ => check_single(filter, value, path, errors),
    }
}

fn check_single(filter: &AllowedFilter, value: &Value, path: &str, errors: &mut ValidationErrors) {
    if value.is_array() || value.is_object() {
        errors.add(path, ValidationKind::Type, format!("The {path} must be a single value."));
    } else if let Err(message) = filter.check_value(value, path) {
        errors.add(path, ValidationKind::InvalidValue, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allowed::{AllowedScope, AllowedSort};
    use serde_json::json;

    fn definition() -> ResourceDefinition {
        ResourceDefinition::new("posts", "posts")
            .with_filters(vec![
                AllowedFilter::string("color"),
                AllowedFilter::number("likes"),
                AllowedFilter::timestamp("publish_at"),
                AllowedFilter::json("labels"),
                AllowedFilter::string("myTitleAlias").mapped_to("title"),
            ])
            .with_scopes(vec![AllowedScope::named("published")])
            .with_sorts(vec![AllowedSort::field("title")])
    }

    fn validate_with(config: &SearchConfig, payload: &Value) -> Result<(), SearchError> {
        let definition = definition();
        SearchRequestValidator::new(config, &definition).validate(payload)
    }

    fn validate(payload: Value) -> Result<(), SearchError> {
        validate_with(&SearchConfig::default(), &payload)
    }

    fn errors(payload: Value) -> ValidationErrors {
        match validate(payload) {
            Err(SearchError::Validation(errors)) => errors,
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    fn filter(field: &str, operator: &str, value: Value) -> Value {
        json!({"filters": [{"field": field, "operator": operator, "value": value}]})
    }

    fn accepts(field: &str, operator: &str, value: Value) -> bool {
        validate(filter(field, operator, value)).is_ok()
    }

    // ============================================================================
    // Depth
    // ============================================================================

    fn nest(levels: usize, leaf: Value) -> Value {
        (0..levels).fold(leaf, |inner, _| json!({"nested": [inner]}))
    }

    #[test]
    fn test_observed_depth() {
        assert_eq!(observed_depth(&json!([])), 0);
        assert_eq!(observed_depth(&json!([{"field": "color", "value": "red"}])), 1);
        assert_eq!(observed_depth(&json!([{"field": "color", "value": ["red"]}])), 2);
        assert_eq!(observed_depth(&json!([nest(2, json!({"field": "color"}))])), 5);
        assert_eq!(nesting_depth(&json!([nest(2, json!({"field": "color"}))])), 2);
    }

    #[test]
    fn test_depth_within_limit_is_accepted() {
        let config = SearchConfig {
            max_nested_depth: 2,
            ..SearchConfig::default()
        };
        let payload = json!({"filters": [nest(2, json!({"field": "color", "value": "red"}))]});
        assert!(validate_with(&config, &payload).is_ok());
    }

    #[test]
    fn test_depth_exceeded_wins_over_field_errors() {
        let config = SearchConfig {
            max_nested_depth: 2,
            ..SearchConfig::default()
        };
        let payload = json!({"filters": [nest(3, json!({"field": "secret", "operator": "??"}))]});
        assert!(matches!(
            validate_with(&config, &payload),
            Err(SearchError::NestedDepthExceeded { depth: 3, max: 2 })
        ));
    }

    #[test]
    fn test_raising_the_ceiling_admits_the_same_payload() {
        let payload = json!({"filters": [nest(3, json!({"field": "color", "value": "red"}))]});
        let ceiling = |max_nested_depth| SearchConfig {
            max_nested_depth,
            ..SearchConfig::default()
        };

        assert!(matches!(
            validate_with(&ceiling(2), &payload),
            Err(SearchError::NestedDepthExceeded { depth: 3, max: 2 })
        ));
        assert!(validate_with(&ceiling(3), &payload).is_ok());
    }

    #[test]
    fn test_value_arrays_count_towards_depth() {
        let config = SearchConfig {
            max_nested_depth: 2,
            ..SearchConfig::default()
        };
        let payload = json!({"filters": [nest(2, json!({"field": "color", "operator": "in", "value": ["red"]}))]});
        assert!(matches!(
            validate_with(&config, &payload),
            Err(SearchError::NestedDepthExceeded { depth: 3, .. })
        ));
    }

    // ============================================================================
    // Filter values
    // ============================================================================

    #[test]
    fn test_string_scalar_values() {
        for operator in ["=", "!=", ">", ">=", "<", "<=", "like", "not like"] {
            for value in [json!("red"), json!("blue"), json!(""), json!(null)] {
                assert!(accepts("color", operator, value.clone()), "{operator} {value}");
            }
            for value in [json!(1), json!(100), json!([]), json!(["red"]), json!(false)] {
                assert!(!accepts("color", operator, value.clone()), "{operator} {value}");
            }
        }
    }

    #[test]
    fn test_string_membership_values() {
        for operator in ["in", "not in"] {
            for value in [json!(["red"]), json!(["red", "blue"]), json!(["red", null])] {
                assert!(accepts("color", operator, value.clone()), "{operator} {value}");
            }
            for value in [json!("red"), json!(""), json!(null), json!(false), json!([]), json!([100]), json!([false])] {
                assert!(!accepts("color", operator, value.clone()), "{operator} {value}");
            }
        }
    }

    #[test]
    fn test_number_values() {
        for value in [json!(-1), json!(0), json!(1), json!(2), json!(null), json!("")] {
            assert!(accepts("likes", "=", value.clone()), "{value}");
        }
        for value in [json!("1"), json!("100"), json!("red"), json!([]), json!(["red"]), json!(false)] {
            assert!(!accepts("likes", "=", value.clone()), "{value}");
        }
        assert!(accepts("likes", "in", json!([1])));
        assert!(accepts("likes", "in", json!([1, 2])));
        assert!(accepts("likes", "in", json!([3, null])));
        assert!(!accepts("likes", "in", json!(["100"])));
    }

    #[test]
    fn test_number_rejects_pattern_operators() {
        let errors = errors(filter("likes", "like", json!(1)));
        assert_eq!(errors.kind_of("filters.0.operator"), Some(ValidationKind::OperatorNotAllowed));
    }

    #[test]
    fn test_timestamp_values() {
        for value in [json!(null), json!(""), json!("2022-01-01"), json!("2022-01-01 00:00:00"), json!("2022-01-01T00:00:00")] {
            assert!(accepts("publish_at", ">", value.clone()), "{value}");
        }
        for value in [json!(1_659_571_200), json!("now"), json!("yesterday"), json!("+1 week"), json!("red")] {
            assert!(!accepts("publish_at", ">", value.clone()), "{value}");
        }
        assert!(accepts("publish_at", "in", json!([null])));
    }

    #[test]
    fn test_json_containment_values() {
        assert!(accepts("labels", "all in", json!(["a", "b"])));
        assert!(accepts("labels", "any in", json!("a")));
        assert!(!accepts("labels", "any in", json!([])));
        assert!(!accepts("labels", "all in", json!([["a"]])));
        assert!(!accepts("labels", "=", json!("a")));
    }

    #[test]
    fn test_element_errors_are_indexed() {
        let errors = errors(filter("color", "in", json!(["red", 7])));
        assert!(errors.has("filters.0.value.1"));
        assert!(!errors.has("filters.0.value.0"));
    }

    // ============================================================================
    // Filter structure
    // ============================================================================

    #[test]
    fn test_missing_operator_means_equals() {
        assert!(validate(json!({"filters": [{"field": "color", "value": "red"}]})).is_ok());
        assert!(validate(json!({"filters": [{"field": "color", "operator": null, "value": "red"}]})).is_ok());
    }

    #[test]
    fn test_unknown_field_and_operator() {
        let errors = errors(json!({"filters": [
            {"field": "title", "value": "x"},
            {"field": "color", "operator": "~", "value": "x"},
            {"field": "bad field", "value": "x"}
        ]}));
        assert_eq!(errors.kind_of("filters.0.field"), Some(ValidationKind::NotAllowed));
        assert_eq!(errors.kind_of("filters.1.operator"), Some(ValidationKind::InvalidChoice));
        assert_eq!(errors.kind_of("filters.2.field"), Some(ValidationKind::Format));
        assert_eq!(errors.to_map()["filters.0.field"], vec!["The selected filters.0.field is invalid."]);
    }

    #[test]
    fn test_alias_is_the_only_accepted_name() {
        assert!(accepts("myTitleAlias", "=", json!("x")));
        assert!(!accepts("title", "=", json!("x")));
    }

    #[test]
    fn test_field_required_without_nested() {
        let errors = errors(json!({"filters": [{"operator": "=", "value": "x"}]}));
        assert_eq!(
            errors.to_map()["filters.0.field"],
            vec!["The filters.0.field field is required when filters.0.nested is not present."]
        );
        assert!(validate(json!({"filters": [{"nested": [{"field": "color", "value": "red"}]}]})).is_ok());
    }

    #[test]
    fn test_nested_errors_carry_full_path() {
        let errors = errors(json!({"filters": [
            {"field": "color", "value": "red"},
            {"type": "or", "nested": [{"field": "likes", "value": "many"}]}
        ]}));
        assert_eq!(errors.kind_of("filters.1.nested.0.value"), Some(ValidationKind::InvalidValue));
    }

    #[test]
    fn test_filter_type_choices() {
        assert!(validate(json!({"filters": [{"type": "or", "field": "color", "value": "red"}]})).is_ok());
        let errors = errors(json!({"filters": [{"type": "xor", "field": "color", "value": "red"}]}));
        assert_eq!(errors.kind_of("filters.0.type"), Some(ValidationKind::InvalidChoice));
    }

    #[test]
    fn test_filters_must_be_arrays() {
        assert!(errors(json!({"filters": {"field": "color"}})).has("filters"));
        assert!(errors(json!({"filters": [{"nested": "x"}]})).has("filters.0.nested"));
        assert!(errors(json!({"filters": ["color"]})).has("filters.0"));
    }

    // ============================================================================
    // Scopes, search, sort, page, flags
    // ============================================================================

    #[test]
    fn test_scopes() {
        assert!(validate(json!({"scopes": [{"name": "published", "parameters": ["2019-01-01"]}]})).is_ok());
        let errors = errors(json!({"scopes": [{"name": "secret"}, {}, {"name": "published", "parameters": "x"}]}));
        assert_eq!(errors.kind_of("scopes.0.name"), Some(ValidationKind::NotAllowed));
        assert_eq!(errors.kind_of("scopes.1.name"), Some(ValidationKind::Required));
        assert_eq!(errors.kind_of("scopes.2.parameters"), Some(ValidationKind::Type));
    }

    #[test]
    fn test_search() {
        assert!(validate(json!({"search": {"value": "x"}})).is_ok());
        assert!(validate(json!({"search": {"value": null}})).is_ok());
        assert!(errors(json!({"search": "x"})).has("search"));
        assert!(errors(json!({"search": {"value": 5}})).has("search.value"));

        for flag in [json!(true), json!(false), json!(0), json!(1), json!("1")] {
            assert!(validate(json!({"search": {"value": "x", "case_sensitive": flag}})).is_ok());
        }
        for flag in [json!("true"), json!("yes"), json!(100)] {
            assert!(errors(json!({"search": {"value": "x", "case_sensitive": flag}})).has("search.case_sensitive"));
        }
    }

    #[test]
    fn test_sort() {
        assert!(validate(json!({"sort": [{"field": "title", "direction": "desc"}]})).is_ok());
        let errors = errors(json!({"sort": [{"field": "secret"}, {"direction": "asc"}, {"field": "title", "direction": "up"}]}));
        assert_eq!(errors.kind_of("sort.0.field"), Some(ValidationKind::NotAllowed));
        assert_eq!(errors.kind_of("sort.1.field"), Some(ValidationKind::Required));
        assert_eq!(errors.kind_of("sort.2.direction"), Some(ValidationKind::InvalidChoice));
    }

    #[test]
    fn test_page() {
        assert!(validate(json!({"page": {"size": 30, "number": 2}})).is_ok());
        let errors = errors(json!({"page": {"size": 31, "number": 0}}));
        assert_eq!(errors.kind_of("page.size"), Some(ValidationKind::TooLarge));
        assert_eq!(errors.kind_of("page.number"), Some(ValidationKind::TooSmall));
        assert_eq!(errors.to_map()["page.size"], vec!["The page.size must not be greater than 30."]);

        let errors = self::errors(json!({"page": {"size": "ten"}}));
        assert_eq!(errors.kind_of("page.size"), Some(ValidationKind::Type));
    }

    #[test]
    fn test_page_number_bounded_by_offset() {
        let last = max_page_number(30);
        assert!(validate(json!({"page": {"number": last}})).is_ok());

        let errors = errors(json!({"page": {"number": last + 1}}));
        assert_eq!(errors.kind_of("page.number"), Some(ValidationKind::TooLarge));
        assert_eq!(
            errors.to_map()["page.number"],
            vec![format!("The page.number must not be greater than {last}.")]
        );

        // The bound follows the requested size.
        assert!(validate(json!({"page": {"size": 1, "number": last + 1}})).is_ok());
        assert!(validate(json!({"page": {"size": 1, "number": i64::MAX}})).is_ok());
        assert!(self::errors(json!({"page": {"size": 2, "number": i64::MAX}})).has("page.number"));
    }

    #[test]
    fn test_trashed_flags() {
        assert!(validate(json!({"with_trashed": true, "only_trashed": "0"})).is_ok());
        assert!(errors(json!({"with_trashed": "yes"})).has("with_trashed"));
    }

    #[test]
    fn test_payload_must_be_an_object() {
        assert!(errors(json!([])).has("payload"));
    }

    #[test]
    fn test_errors_are_collected_across_sections() {
        let errors = errors(json!({
            "scopes": [{"name": "secret"}],
            "filters": [{"field": "secret"}],
            "sort": [{"field": "secret"}]
        }));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_validated_decodes_request() {
        let definition = definition();
        let config = SearchConfig::default();
        let request = SearchRequestValidator::new(&config, &definition)
            .validated(&json!({"filters": [{"field": "color", "value": "red"}], "page": {"size": 5}}))
            .unwrap();
        assert_eq!(request.filters.len(), 1);
        assert_eq!(request.page.and_then(|page| page.size), Some(5));
    }
}
