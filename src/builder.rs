//! Compile a validated [`SearchRequest`] into a Sea-ORM query.
//!
//! [`SearchQueryBuilder::build`] applies, in order: scopes, filters, full-text
//! search, sorts and the soft-delete constraint. Each step is also public so callers
//! can compose their own pipeline.

use std::collections::BTreeSet;
use std::marker::PhantomData;

use sea_orm::sea_query::{Alias, Condition, Expr, JoinType};
use sea_orm::{DatabaseBackend, EntityTrait, Order, QueryTrait, Select};
use serde_json::Value;

use crate::allowed::Aliasable;
use crate::config::SearchConfig;
use crate::errors::SearchError;
use crate::filtering::conditions::FilterCompiler;
use crate::filtering::{QualifiedColumn, search, sort};
use crate::models::{FilterNode, ScopeDescriptor, SearchDescriptor, SearchRequest, SortDescriptor};
use crate::relation::Hop;
use crate::resource::{ResourceDefinition, SearchResource};

/// A query under construction, plus what the builder needs to know about it.
#[derive(Debug, Clone)]
pub struct SearchQuery<E: EntityTrait> {
    select: Select<E>,
    table: String,
    pivot: Option<String>,
    joined: BTreeSet<String>,
}

impl<E: EntityTrait> SearchQuery<E> {
    #[must_use]
    pub fn new(select: Select<E>) -> Self {
        Self {
            select,
            table: E::default().table_name().to_string(),
            pivot: None,
            joined: BTreeSet::new(),
        }
    }

    /// Mark the query as running through `pivot`, enabling `pivot.*` fields.
    #[must_use]
    pub fn with_pivot(mut self, pivot: &str) -> Self {
        self.pivot = Some(pivot.to_string());
        self.joined.insert(pivot.to_string());
        self
    }

    /// Register a table the caller already joined so sorts do not join it again.
    #[must_use]
    pub fn with_joined(mut self, table: &str) -> Self {
        self.joined.insert(table.to_string());
        self
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn pivot(&self) -> Option<&str> {
        self.pivot.as_deref()
    }

    #[must_use]
    pub fn is_joined(&self, table: &str) -> bool {
        self.joined.contains(table)
    }

    /// AND `condition` into the `WHERE` clause. Empty conditions are ignored.
    pub fn where_condition(&mut self, condition: Condition) {
        if !condition.is_empty() {
            QueryTrait::query(&mut self.select).cond_where(condition);
        }
    }

    pub fn order_by(&mut self, column: &QualifiedColumn, order: Order) {
        QueryTrait::query(&mut self.select).order_by_expr(column.expr().into(), order);
    }

    /// `LEFT JOIN` the hop's target table unless it is already part of the query.
    /// Returns whether a join was added.
    pub fn left_join(&mut self, hop: &Hop) -> bool {
        if hop.to_table == self.table || !self.joined.insert(hop.to_table.clone()) {
            return false;
        }
        QueryTrait::query(&mut self.select).join(
            JoinType::LeftJoin,
            Alias::new(hop.to_table.as_str()),
            Expr::col((Alias::new(hop.to_table.as_str()), Alias::new(hop.to_column.as_str())))
                .equals((Alias::new(hop.from_table.as_str()), Alias::new(hop.from_column.as_str()))),
        );
        true
    }

    /// Replace the underlying select with `f(select)`.
    pub fn try_map(
        &mut self,
        f: impl FnOnce(Select<E>) -> Result<Select<E>, SearchError>,
    ) -> Result<(), SearchError> {
        let select = std::mem::replace(&mut self.select, E::find());
        self.select = f(select)?;
        Ok(())
    }

    #[must_use]
    pub fn select(&self) -> &Select<E> {
        &self.select
    }

    #[must_use]
    pub fn into_select(self) -> Select<E> {
        self.select
    }

    /// The statement as SQL with values inlined.
    #[must_use]
    pub fn to_sql(&self, backend: DatabaseBackend) -> String {
        self.select.build(backend).to_string()
    }
}

pub struct SearchQueryBuilder<'a, R> {
    definition: &'a ResourceDefinition,
    config: &'a SearchConfig,
    backend: DatabaseBackend,
    resource: PhantomData<fn() -> R>,
}

impl<'a, R: SearchResource> SearchQueryBuilder<'a, R> {
    #[must_use]
    pub fn new(definition: &'a ResourceDefinition, config: &'a SearchConfig, backend: DatabaseBackend) -> Self {
        Self {
            definition,
            config,
            backend,
            resource: PhantomData,
        }
    }

    pub fn build(
        &self,
        mut query: SearchQuery<R::EntityType>,
        request: &SearchRequest,
    ) -> Result<SearchQuery<R::EntityType>, SearchError> {
        self.apply_scopes(&mut query, &request.scopes)?;
        self.apply_filters(&mut query, &request.filters)?;
        self.apply_search(&mut query, request.search.as_ref())?;
        self.apply_sorts(&mut query, &request.sort)?;
        self.apply_soft_deletes(&mut query, request);
        Ok(query)
    }

    /// Run each whitelisted scope with its static arguments followed by the request's parameters.
    pub fn apply_scopes(
        &self,
        query: &mut SearchQuery<R::EntityType>,
        scopes: &[ScopeDescriptor],
    ) -> Result<(), SearchError> {
        for descriptor in scopes {
            let Some(scope) = self.definition.scopes.get(&descriptor.name) else {
                tracing::debug!(resource = R::RESOURCE_NAME, scope = %descriptor.name, "dropping scope that is not whitelisted");
                continue;
            };
            let args: Vec<Value> = scope.args().iter().chain(&descriptor.parameters).cloned().collect();
            query.try_map(|select| R::apply_scope(select, scope.internal_name(), &args))?;
        }
        Ok(())
    }

    pub fn apply_filters(
        &self,
        query: &mut SearchQuery<R::EntityType>,
        filters: &[FilterNode],
    ) -> Result<(), SearchError> {
        let condition = FilterCompiler::new(self.definition, self.config, self.backend, query.pivot())
            .compile(filters)?;
        query.where_condition(condition);
        Ok(())
    }

    /// Substring search; blank or missing text leaves the query untouched.
    pub fn apply_search(
        &self,
        query: &mut SearchQuery<R::EntityType>,
        descriptor: Option<&SearchDescriptor>,
    ) -> Result<(), SearchError> {
        let Some(descriptor) = descriptor else {
            return Ok(());
        };
        let Some(text) = descriptor.value.as_deref().filter(|text| !text.is_empty()) else {
            return Ok(());
        };
        let case_sensitive = descriptor.case_sensitive.unwrap_or(self.config.case_sensitive);
        let condition = search::search_condition(self.definition, query.pivot(), text, case_sensitive)?;
        query.where_condition(condition);
        Ok(())
    }

    pub fn apply_sorts(
        &self,
        query: &mut SearchQuery<R::EntityType>,
        sorts: &[SortDescriptor],
    ) -> Result<(), SearchError> {
        sort::apply_sorts(self.definition, query, sorts)
    }

    /// Hide trashed rows unless the request asks for them.
    pub fn apply_soft_deletes(&self, query: &mut SearchQuery<R::EntityType>, request: &SearchRequest) {
        let Some(column) = self.definition.soft_delete_column.as_deref() else {
            return;
        };
        let column = QualifiedColumn::new(&self.definition.table, column);
        if request.only_trashed == Some(true) {
            query.where_condition(Condition::all().add(column.expr().is_not_null()));
        } else if request.with_trashed != Some(true) {
            query.where_condition(Condition::all().add(column.expr().is_null()));
        }
    }
}
