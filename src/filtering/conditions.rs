//! Filter trees to `WHERE` conditions.
//!
//! Nodes are read left to right the way a `where ... and ... or ...` chain reads in
//! SQL: `and` binds tighter than `or`, so the node list is cut into OR-separated runs
//! of AND-ed conditions. A node with `nested` compiles its children the same way and
//! lands in the parent as one parenthesized condition.

use sea_orm::sea_query::{Alias, Condition, Expr, Func, SimpleExpr};
use sea_orm::{DatabaseBackend, Value};
use serde_json::{Value as Json, json};

use super::{Operator, QualifiedColumn, pattern_text, sql_value};
use crate::allowed::Aliasable;
use crate::allowed::rules::midnight_date;
use crate::config::SearchConfig;
use crate::errors::SearchError;
use crate::models::{FilterNode, FilterType};
use crate::relation::{FieldPath, correlated_subquery};
use crate::resource::ResourceDefinition;

pub struct FilterCompiler<'a> {
    definition: &'a ResourceDefinition,
    config: &'a SearchConfig,
    backend: DatabaseBackend,
    pivot: Option<&'a str>,
}

impl<'a> FilterCompiler<'a> {
    #[must_use]
    pub fn new(
        definition: &'a ResourceDefinition,
        config: &'a SearchConfig,
        backend: DatabaseBackend,
        pivot: Option<&'a str>,
    ) -> Self {
        Self {
            definition,
            config,
            backend,
            pivot,
        }
    }

    /// Compile a node list. Nodes whose field is not whitelisted are skipped; the
    /// result is empty when nothing survives.
    pub fn compile(&self, nodes: &[FilterNode]) -> Result<Condition, SearchError> {
        let mut groups = Vec::new();
        let mut current = Condition::all();

        for node in nodes {
            let Some(condition) = self.compile_node(node)? else {
                continue;
            };
            if node.kind == FilterType::Or && !current.is_empty() {
                groups.push(std::mem::replace(&mut current, Condition::all()));
            }
            current = current.add(condition);
        }
        if !current.is_empty() {
            groups.push(current);
        }

        Ok(match groups.len() {
            0 => Condition::all(),
            1 => groups.remove(0),
            _ => groups.into_iter().fold(Condition::any(), |any, group| any.add(group)),
        })
    }

    fn compile_node(&self, node: &FilterNode) -> Result<Option<Condition>, SearchError> {
        if let Some(children) = &node.nested {
            let group = self.compile(children)?;
            return Ok((!group.is_empty()).then_some(group));
        }

        let Some(field) = node.field.as_deref() else {
            return Ok(None);
        };
        let Some(filter) = self.definition.filters.get(field) else {
            tracing::debug!(resource = %self.definition.name, field, "dropping filter on a field that is not whitelisted");
            return Ok(None);
        };

        let raw = node.operator.as_deref().unwrap_or("=");
        let operator = Operator::parse(raw)
            .filter(|operator| filter.allows(*operator))
            .ok_or_else(|| SearchError::operator_not_allowed(field, raw))?;

        let condition = match FieldPath::parse(filter.internal_name()) {
            FieldPath::Column(column) => self.column_condition(
                &QualifiedColumn::new(&self.definition.table, column),
                operator,
                &node.value,
                self.definition.is_date_column(column),
            ),
            FieldPath::Pivot(column) => self.pivot_condition(field, column, operator, &node.value),
            FieldPath::Related { relation, column } => {
                self.relation_condition(relation, column, operator, &node.value)
            }
        }?;
        Ok(Some(condition))
    }

    /// Condition on one column, splitting `null` out of value lists.
    ///
    /// `[null, a, b]` with a positive operator means "is null, or matches a or b";
    /// with a negated operator it means "is not null, and matches neither".
    pub fn column_condition(
        &self,
        column: &QualifiedColumn,
        operator: Operator,
        value: &Json,
        dates: bool,
    ) -> Result<Condition, SearchError> {
        if operator.is_json_containment() {
            return Ok(self.json_containment(column, operator, value));
        }

        let Json::Array(values) = value else {
            return Ok(Condition::all().add(scalar_condition(column, operator, value, dates)));
        };

        let present: Vec<&Json> = values.iter().filter(|value| !value.is_null()).collect();
        if present.len() == values.len() {
            return Ok(list_condition(column, operator, &present));
        }

        let null_check = if operator.is_negated() {
            column.expr().is_not_null()
        } else {
            column.expr().is_null()
        };
        if present.is_empty() {
            return Ok(Condition::all().add(null_check));
        }

        let rest = list_condition(column, operator, &present);
        Ok(if operator.is_negated() {
            Condition::all().add(null_check).add(rest)
        } else {
            Condition::any().add(null_check).add(rest)
        })
    }

    fn pivot_condition(
        &self,
        field: &str,
        column: &str,
        operator: Operator,
        value: &Json,
    ) -> Result<Condition, SearchError> {
        let Some(pivot) = self.pivot else {
            return Err(SearchError::invalid_filter(
                field,
                "pivot columns can only be filtered on queries through a pivot table",
            ));
        };
        let has_null = value.as_array().is_some_and(|values| values.iter().any(Json::is_null));
        if has_null && !self.config.pivot_null_filters {
            return Err(SearchError::Unsupported(format!(
                "filtering pivot column '{column}' by null is not supported"
            )));
        }
        self.column_condition(&QualifiedColumn::new(pivot, column), operator, value, false)
    }

    /// `EXISTS` over the relation's tables; negated operators become `NOT EXISTS`
    /// over the positive comparison, so "not in [a]" reads "has no related a".
    fn relation_condition(
        &self,
        relation: &str,
        column: &str,
        operator: Operator,
        value: &Json,
    ) -> Result<Condition, SearchError> {
        let hops = self
            .definition
            .relation(relation)?
            .hops(&self.definition.table)
            .ok_or_else(|| SearchError::invalid_filter(relation, "filters cannot traverse a polymorphic relation"))?;

        let positive = operator.positive();
        let subquery = correlated_subquery(&hops, |alias| {
            self.column_condition(&QualifiedColumn::new(alias, column), positive, value, false)
        })?;

        let exists = Condition::all().add(Expr::exists(subquery));
        Ok(if operator.is_negated() { exists.not() } else { exists })
    }

    /// `all in` requires every listed element in the JSON array column, `any in` at least one.
    fn json_containment(&self, column: &QualifiedColumn, operator: Operator, value: &Json) -> Condition {
        let elements: Vec<&Json> = match value {
            Json::Array(values) => values.iter().filter(|value| !value.is_null()).collect(),
            Json::Null => Vec::new(),
            scalar => vec![scalar],
        };
        if elements.is_empty() {
            return Condition::all().add(column.expr().is_null());
        }

        let combined = if operator == Operator::AllIn {
            Condition::all()
        } else {
            Condition::any()
        };
        elements
            .into_iter()
            .fold(combined, |condition, element| condition.add(self.contains(column, element)))
    }

    fn contains(&self, column: &QualifiedColumn, element: &Json) -> SimpleExpr {
        match self.backend {
            DatabaseBackend::Postgres => Expr::cust_with_exprs(
                "$1::jsonb @> $2::jsonb",
                [column.expr().into(), Expr::val(json!([element]).to_string()).into()],
            ),
            DatabaseBackend::MySql => Func::cust(Alias::new("JSON_CONTAINS"))
                .arg(column.expr())
                .arg(element.to_string())
                .into(),
            _ => Expr::cust_with_exprs(
                "EXISTS (SELECT 1 FROM json_each($1) WHERE json_each.value = $2)",
                [column.expr().into(), bound(element)],
            ),
        }
    }
}

fn bound(value: &Json) -> SimpleExpr {
    sql_value(value).map_or_else(|| Expr::val(Option::<String>::None).into(), SimpleExpr::Value)
}

/// Comparison of one column with a single value. Date columns compared with a
/// midnight timestamp compare by calendar day.
fn scalar_condition(column: &QualifiedColumn, operator: Operator, value: &Json, dates: bool) -> SimpleExpr {
    let ordering = matches!(
        operator,
        Operator::Eq | Operator::Ne | Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte
    );
    if dates && ordering {
        if let Some(day) = value.as_str().and_then(midnight_date) {
            let lhs = Expr::expr(Func::cust(Alias::new("DATE")).arg(column.expr()));
            return compare(lhs, operator, &json!(day.format("%Y-%m-%d").to_string()));
        }
    }
    compare(column.expr(), operator, value)
}

/// Comparison of one column with several values.
fn list_condition(column: &QualifiedColumn, operator: Operator, values: &[&Json]) -> Condition {
    let bound: Vec<Value> = values.iter().filter_map(|value| sql_value(value)).collect();
    match operator {
        Operator::Eq | Operator::In => Condition::all().add(column.expr().is_in(bound)),
        Operator::Ne | Operator::NotIn => Condition::all().add(column.expr().is_not_in(bound)),
        other => {
            let combined = if other.is_negated() {
                Condition::all()
            } else {
                Condition::any()
            };
            values
                .iter()
                .fold(combined, |condition, value| condition.add(compare(column.expr(), other, value)))
        }
    }
}

fn compare(lhs: Expr, operator: Operator, value: &Json) -> SimpleExpr {
    let Some(bound) = sql_value(value) else {
        return if operator.is_negated() {
            lhs.is_not_null()
        } else {
            lhs.is_null()
        };
    };
    match operator {
        Operator::Eq | Operator::AllIn | Operator::AnyIn => lhs.eq(bound),
        Operator::Ne => lhs.ne(bound),
        Operator::Gt => lhs.gt(bound),
        Operator::Gte => lhs.gte(bound),
        Operator::Lt => lhs.lt(bound),
        Operator::Lte => lhs.lte(bound),
        Operator::Like => lhs.like(pattern_text(value)),
        Operator::NotLike => lhs.not_like(pattern_text(value)),
        Operator::ILike => Expr::expr(Func::lower(lhs)).like(pattern_text(value).to_lowercase()),
        Operator::NotILike => Expr::expr(Func::lower(lhs)).not_like(pattern_text(value).to_lowercase()),
        Operator::In => lhs.is_in([bound]),
        Operator::NotIn => lhs.is_not_in([bound]),
    }
}
