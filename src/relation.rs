//! Relation metadata and dotted field paths.
//!
//! Filters, search fields and sorts may reference columns of related tables with a
//! dotted path: `user.name` names column `name` of the resource's `user` relation,
//! `user.company.name` names column `name` of relation `user.company`, and
//! `pivot.added_at` names a column of the pivot table a many-to-many query runs
//! through. A [`Relation`] describes how to get from the resource table to the
//! related table as a list of join [`Hop`]s.

use sea_orm::sea_query::{Alias, Condition, Expr, JoinType, Query, SelectStatement};

use crate::errors::SearchError;

/// Path prefix that addresses the pivot table of a many-to-many query.
pub const PIVOT: &str = "pivot";

/// A dotted field path split into what it addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPath<'a> {
    /// Column of the resource table
    Column(&'a str),
    /// Column of the pivot table
    Pivot(&'a str),
    /// Column of a related table
    Related { relation: &'a str, column: &'a str },
}

impl<'a> FieldPath<'a> {
    /// Split at the last dot: everything before it is the relation name.
    #[must_use]
    pub fn parse(path: &'a str) -> Self {
        match path.rsplit_once('.') {
            None => Self::Column(path),
            Some((PIVOT, column)) => Self::Pivot(column),
            Some((relation, column)) => Self::Related { relation, column },
        }
    }
}

/// One join step: `to_table.to_column = from_table.from_column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

impl Hop {
    fn new(from_table: &str, from_column: &str, to_table: &str, to_column: &str) -> Self {
        Self {
            from_table: from_table.to_string(),
            from_column: from_column.to_string(),
            to_table: to_table.to_string(),
            to_column: to_column.to_string(),
        }
    }
}

/// How a resource reaches a related table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// The resource row holds `foreign_key` pointing at `table.owner_key`.
    BelongsTo {
        table: String,
        foreign_key: String,
        owner_key: String,
    },
    /// `table.foreign_key` points back at the resource's `local_key`; at most one row.
    HasOne {
        table: String,
        foreign_key: String,
        local_key: String,
    },
    /// `table.foreign_key` points back at the resource's `local_key`.
    HasMany {
        table: String,
        foreign_key: String,
        local_key: String,
    },
    /// Many-to-many through `pivot`.
    BelongsToMany {
        table: String,
        pivot: String,
        foreign_pivot_key: String,
        related_pivot_key: String,
        parent_key: String,
        related_key: String,
    },
    /// Relations followed one after another.
    Through(Vec<Relation>),
    /// Polymorphic: the target table is only known per row.
    MorphTo,
}

impl Relation {
    pub fn belongs_to(table: &str, foreign_key: &str, owner_key: &str) -> Self {
        Self::BelongsTo {
            table: table.to_string(),
            foreign_key: foreign_key.to_string(),
            owner_key: owner_key.to_string(),
        }
    }

    pub fn has_one(table: &str, foreign_key: &str, local_key: &str) -> Self {
        Self::HasOne {
            table: table.to_string(),
            foreign_key: foreign_key.to_string(),
            local_key: local_key.to_string(),
        }
    }

    pub fn has_many(table: &str, foreign_key: &str, local_key: &str) -> Self {
        Self::HasMany {
            table: table.to_string(),
            foreign_key: foreign_key.to_string(),
            local_key: local_key.to_string(),
        }
    }

    /// `pivot.foreign_pivot_key` references the resource's `parent_key` and
    /// `pivot.related_pivot_key` references `table.related_key`.
    pub fn belongs_to_many(
        table: &str,
        pivot: &str,
        foreign_pivot_key: &str,
        related_pivot_key: &str,
        parent_key: &str,
        related_key: &str,
    ) -> Self {
        Self::BelongsToMany {
            table: table.to_string(),
            pivot: pivot.to_string(),
            foreign_pivot_key: foreign_pivot_key.to_string(),
            related_pivot_key: related_pivot_key.to_string(),
            parent_key: parent_key.to_string(),
            related_key: related_key.to_string(),
        }
    }

    #[must_use]
    pub fn through(relations: Vec<Relation>) -> Self {
        Self::Through(relations)
    }

    #[must_use]
    pub fn morph_to() -> Self {
        Self::MorphTo
    }

    #[must_use]
    pub fn is_polymorphic(&self) -> bool {
        match self {
            Self::MorphTo => true,
            Self::Through(relations) => relations.iter().any(Self::is_polymorphic),
            _ => false,
        }
    }

    /// Table the relation ends at.
    #[must_use]
    pub fn related_table(&self) -> Option<&str> {
        match self {
            Self::BelongsTo { table, .. }
            | Self::HasOne { table, .. }
            | Self::HasMany { table, .. }
            | Self::BelongsToMany { table, .. } => Some(table),
            Self::Through(relations) => relations.last().and_then(Self::related_table),
            Self::MorphTo => None,
        }
    }

    /// Join steps from `parent` to the related table, or `None` for polymorphic relations.
    #[must_use]
    pub fn hops(&self, parent: &str) -> Option<Vec<Hop>> {
        match self {
            Self::BelongsTo {
                table,
                foreign_key,
                owner_key,
            } => Some(vec![Hop::new(parent, foreign_key, table, owner_key)]),
            Self::HasOne {
                table,
                foreign_key,
                local_key,
            }
            | Self::HasMany {
                table,
                foreign_key,
                local_key,
            } => Some(vec![Hop::new(parent, local_key, table, foreign_key)]),
            Self::BelongsToMany {
                table,
                pivot,
                foreign_pivot_key,
                related_pivot_key,
                parent_key,
                related_key,
            } => Some(vec![
                Hop::new(parent, parent_key, pivot, foreign_pivot_key),
                Hop::new(pivot, related_pivot_key, table, related_key),
            ]),
            Self::Through(relations) => {
                let mut hops = Vec::new();
                let mut from = parent.to_string();
                for relation in relations {
                    hops.extend(relation.hops(&from)?);
                    from = relation.related_table()?.to_string();
                }
                (!hops.is_empty()).then_some(hops)
            }
            Self::MorphTo => None,
        }
    }
}

/// Alias of hop `index`'s table inside a correlated sub-query.
#[must_use]
fn hop_alias(hops: &[Hop], index: usize) -> String {
    format!("{}_{index}", hops[index].to_table)
}

/// `SELECT 1 FROM <hop tables> WHERE <correlated to the outer table> AND <inner>`.
///
/// `inner` receives the alias of the last hop's table and builds the condition on it.
pub fn correlated_subquery(
    hops: &[Hop],
    inner: impl FnOnce(&str) -> Result<Condition, SearchError>,
) -> Result<SelectStatement, SearchError> {
    let Some(first) = hops.first() else {
        return Err(SearchError::Unsupported("relation without join steps".to_string()));
    };

    let mut query = Query::select();
    let first_alias = hop_alias(hops, 0);
    query
        .expr(Expr::val(1))
        .from_as(Alias::new(first.to_table.as_str()), Alias::new(first_alias.as_str()));
    let correlation = Expr::col((Alias::new(first_alias.as_str()), Alias::new(first.to_column.as_str())))
        .equals((Alias::new(first.from_table.as_str()), Alias::new(first.from_column.as_str())));

    for (index, hop) in hops.iter().enumerate().skip(1) {
        let alias = hop_alias(hops, index);
        let previous = hop_alias(hops, index - 1);
        query.join_as(
            JoinType::InnerJoin,
            Alias::new(hop.to_table.as_str()),
            Alias::new(alias.as_str()),
            Expr::col((Alias::new(alias.as_str()), Alias::new(hop.to_column.as_str())))
                .equals((Alias::new(previous.as_str()), Alias::new(hop.from_column.as_str()))),
        );
    }

    let last_alias = hop_alias(hops, hops.len() - 1);
    // a single cond_where: sea-query refuses to mix it with and_where
    query.cond_where(Condition::all().add(correlation).add(inner(&last_alias)?));
    Ok(query)
}
