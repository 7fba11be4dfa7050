use sea_orm::{EntityTrait, Order};

use super::QualifiedColumn;
use crate::allowed::Aliasable;
use crate::builder::SearchQuery;
use crate::errors::SearchError;
use crate::models::SortDescriptor;
use crate::relation::FieldPath;
use crate::resource::ResourceDefinition;

/// Apply sort descriptors in request order.
///
/// Sorting by a related column left-joins every table on the way to it; a table is
/// joined at most once however many sorts go through it. Sorts on fields that are
/// not whitelisted, and sorts through polymorphic relations, are skipped.
pub fn apply_sorts<E: EntityTrait>(
    definition: &ResourceDefinition,
    query: &mut SearchQuery<E>,
    sorts: &[SortDescriptor],
) -> Result<(), SearchError> {
    for sort in sorts {
        let Some(allowed) = definition.sorts.get(&sort.field) else {
            tracing::debug!(resource = %definition.name, field = %sort.field, "dropping sort on a field that is not whitelisted");
            continue;
        };
        let order = Order::from(sort.direction);

        match FieldPath::parse(allowed.internal_name()) {
            FieldPath::Column(column) => {
                query.order_by(&QualifiedColumn::new(&definition.table, column), order);
            }
            FieldPath::Pivot(column) => {
                let Some(pivot) = query.pivot().map(str::to_string) else {
                    return Err(SearchError::invalid_sort(
                        allowed.name(),
                        "pivot columns can only be sorted on queries through a pivot table",
                    ));
                };
                query.order_by(&QualifiedColumn::new(&pivot, column), order);
            }
            FieldPath::Related { relation, column } => {
                let Some(hops) = definition.relation(relation)?.hops(&definition.table) else {
                    tracing::debug!(resource = %definition.name, relation, "skipping sort through a polymorphic relation");
                    continue;
                };
                for hop in &hops {
                    query.left_join(hop);
                }
                if let Some(last) = hops.last() {
                    query.order_by(&QualifiedColumn::new(&last.to_table, column), order);
                }
            }
        }
    }
    Ok(())
}
