use sea_orm::sea_query::{Condition, Expr, Func, LikeExpr, SimpleExpr};

use super::QualifiedColumn;
use crate::errors::SearchError;
use crate::relation::{FieldPath, correlated_subquery};
use crate::resource::ResourceDefinition;

// Basic safety limit
const MAX_SEARCH_QUERY_LENGTH: usize = 10_000;

/// Escape LIKE wildcards so the search text matches literally.
/// Escapes: % (match any) and _ (match single char)
fn escape_like_wildcards(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// `%text%` match against one column.
fn contains(column: &QualifiedColumn, text: &str, case_sensitive: bool) -> SimpleExpr {
    if case_sensitive {
        let pattern = format!("%{}%", escape_like_wildcards(text));
        column.expr().like(LikeExpr::new(pattern).escape('\\'))
    } else {
        let pattern = format!("%{}%", escape_like_wildcards(&text.to_lowercase()));
        Expr::expr(Func::lower(column.expr())).like(LikeExpr::new(pattern).escape('\\'))
    }
}

/// OR of a substring match over every searchable field of the resource.
///
/// Dotted fields search through the relation with an `EXISTS` sub-query;
/// `pivot.*` fields are searched only when the query runs through a pivot table.
pub fn search_condition(
    definition: &ResourceDefinition,
    pivot: Option<&str>,
    text: &str,
    case_sensitive: bool,
) -> Result<Condition, SearchError> {
    let text: String = text.chars().take(MAX_SEARCH_QUERY_LENGTH).collect();
    let mut any = Condition::any();

    for field in &definition.searchable {
        match FieldPath::parse(field) {
            FieldPath::Column(column) => {
                any = any.add(contains(&QualifiedColumn::new(&definition.table, column), &text, case_sensitive));
            }
            FieldPath::Pivot(column) => {
                let Some(pivot) = pivot else {
                    tracing::debug!(resource = %definition.name, field = %field, "skipping pivot search field outside a pivot query");
                    continue;
                };
                any = any.add(contains(&QualifiedColumn::new(pivot, column), &text, case_sensitive));
            }
            FieldPath::Related { relation, column } => {
                let Some(hops) = definition.relation(relation)?.hops(&definition.table) else {
                    tracing::debug!(resource = %definition.name, field = %field, "skipping search through a polymorphic relation");
                    continue;
                };
                let subquery = correlated_subquery(&hops, |alias| {
                    Ok(Condition::all().add(contains(&QualifiedColumn::new(alias, column), &text, case_sensitive)))
                })?;
                any = any.add(Expr::exists(subquery));
            }
        }
    }
    Ok(any)
}
