use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, EntityName, EntityTrait, PaginatorTrait, QuerySelect, QueryTrait,
    Select,
};
use serde_json::Value;

use crate::allowed::{AllowedFilter, AllowedScope, AllowedSort, Registry};
use crate::builder::{SearchQuery, SearchQueryBuilder};
use crate::config::SearchConfig;
use crate::errors::SearchError;
use crate::filtering::pagination::page_window;
use crate::models::SearchResults;
use crate::relation::Relation;
use crate::validator::SearchRequestValidator;

/// A searchable resource: the whitelists clients may use and the hooks the query
/// builder calls into.
///
/// ```rust,ignore
/// struct PostResource;
///
/// impl SearchResource for PostResource {
///     type EntityType = post::Entity;
///     const RESOURCE_NAME: &'static str = "posts";
///
///     fn allowed_filters() -> Vec<AllowedFilter> {
///         vec![AllowedFilter::string("title"), AllowedFilter::string("author").mapped_to("user.name")]
///     }
///
///     fn relation(name: &str) -> Option<Relation> {
///         (name == "user").then(|| Relation::belongs_to("users", "user_id", "id"))
///     }
/// }
/// ```
#[async_trait]
pub trait SearchResource: Sized + Send + Sync + 'static {
    type EntityType: EntityTrait<Model: Sync> + Sync;

    /// Used in log lines and the `Content-Range` header.
    const RESOURCE_NAME: &'static str;

    #[must_use]
    fn allowed_scopes() -> Vec<AllowedScope> {
        Vec::new()
    }

    #[must_use]
    fn allowed_filters() -> Vec<AllowedFilter> {
        Vec::new()
    }

    #[must_use]
    fn allowed_sorts() -> Vec<AllowedSort> {
        Vec::new()
    }

    /// Columns (or dotted relation paths) full-text search looks in.
    #[must_use]
    fn searchable_by() -> Vec<&'static str> {
        Vec::new()
    }

    /// Columns compared by calendar day when a filter value falls on midnight.
    #[must_use]
    fn date_columns() -> Vec<&'static str> {
        vec!["created_at", "updated_at"]
    }

    /// Nullable deletion timestamp; when set, trashed rows are hidden by default.
    #[must_use]
    fn soft_delete_column() -> Option<&'static str> {
        None
    }

    /// Resolve the relation named in a dotted path (`user` in `user.name`).
    #[must_use]
    fn relation(name: &str) -> Option<Relation> {
        let _ = name;
        None
    }

    /// Apply the scope with the given internal name.
    fn apply_scope(
        query: Select<Self::EntityType>,
        scope: &str,
        args: &[Value],
    ) -> Result<Select<Self::EntityType>, SearchError> {
        let _ = (query, args);
        Err(SearchError::invalid_scope(
            scope,
            format!("resource '{}' does not implement this scope", Self::RESOURCE_NAME),
        ))
    }

    /// Registry bundle for this resource.
    fn definition() -> Result<ResourceDefinition, SearchError> {
        ResourceDefinition::of::<Self>()
    }

    /// [`definition`](Self::definition) built on first use and shared by every later call.
    ///
    /// A definition that fails [`check`](ResourceDefinition::check) is not kept, so every
    /// call reports the misconfiguration again.
    fn shared_definition() -> Result<Arc<ResourceDefinition>, SearchError> {
        cached_definition::<Self>()
    }

    /// Validate `payload`, compile it and fetch one page of matches.
    async fn search(
        db: &DatabaseConnection,
        config: &SearchConfig,
        payload: &Value,
    ) -> Result<SearchResults<<Self::EntityType as EntityTrait>::Model>, SearchError> {
        let definition = Self::shared_definition()?;
        let query = SearchQuery::new(Self::EntityType::find());
        Self::search_within(db, config, &definition, payload, query).await
    }

    /// Like [`search`](Self::search), starting from a caller-prepared query
    /// (for instance one already joined through a pivot table).
    async fn search_within(
        db: &DatabaseConnection,
        config: &SearchConfig,
        definition: &ResourceDefinition,
        payload: &Value,
        query: SearchQuery<Self::EntityType>,
    ) -> Result<SearchResults<<Self::EntityType as EntityTrait>::Model>, SearchError> {
        let request = SearchRequestValidator::new(config, definition).validated(payload)?;
        let backend = db.get_database_backend();
        let select = SearchQueryBuilder::<Self>::new(definition, config, backend)
            .build(query, &request)?
            .into_select();
        tracing::trace!(resource = Self::RESOURCE_NAME, sql = %select.build(backend), "compiled search query");

        let total = PaginatorTrait::count(select.clone(), db).await?;
        let (offset, limit) = page_window(request.page.as_ref(), config);
        let data = select.offset(offset).limit(limit).all(db).await?;

        Ok(SearchResults {
            data,
            total,
            offset,
            limit,
        })
    }
}

static DEFINITIONS: OnceLock<RwLock<HashMap<TypeId, Arc<ResourceDefinition>>>> = OnceLock::new();

fn cached_definition<R: SearchResource>() -> Result<Arc<ResourceDefinition>, SearchError> {
    let cache = DEFINITIONS.get_or_init(RwLock::default);
    let key = TypeId::of::<R>();
    if let Some(definition) = cache.read().unwrap_or_else(PoisonError::into_inner).get(&key) {
        return Ok(Arc::clone(definition));
    }

    let definition = Arc::new(R::definition()?);
    tracing::debug!(resource = R::RESOURCE_NAME, "resource definition built");
    let mut definitions = cache.write().unwrap_or_else(PoisonError::into_inner);
    Ok(Arc::clone(definitions.entry(key).or_insert(definition)))
}

/// Everything the validator and builder need to know about a resource, resolved once.
#[derive(Clone)]
pub struct ResourceDefinition {
    pub(crate) name: String,
    pub(crate) table: String,
    pub(crate) filters: Registry<AllowedFilter>,
    pub(crate) scopes: Registry<AllowedScope>,
    pub(crate) sorts: Registry<AllowedSort>,
    pub(crate) searchable: Vec<String>,
    pub(crate) dates: Vec<String>,
    pub(crate) soft_delete_column: Option<String>,
    pub(crate) relations: fn(&str) -> Option<Relation>,
}

fn no_relations(_: &str) -> Option<Relation> {
    None
}

impl ResourceDefinition {
    /// Empty definition for `table`; chain the `with_*` methods and finish with [`check`](Self::check).
    #[must_use]
    pub fn new(name: &str, table: &str) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            filters: Registry::default(),
            scopes: Registry::default(),
            sorts: Registry::default(),
            searchable: Vec::new(),
            dates: Vec::new(),
            soft_delete_column: None,
            relations: no_relations,
        }
    }

    /// Collect the declarations of `R`.
    pub fn of<R: SearchResource>() -> Result<Self, SearchError> {
        let table = R::EntityType::default().table_name().to_string();
        Self::new(R::RESOURCE_NAME, &table)
            .with_filters(R::allowed_filters())
            .with_scopes(R::allowed_scopes())
            .with_sorts(R::allowed_sorts())
            .with_searchable(R::searchable_by())
            .with_dates(R::date_columns())
            .with_soft_deletes(R::soft_delete_column())
            .with_relations(R::relation)
            .check()
    }

    #[must_use]
    pub fn with_filters(mut self, filters: Vec<AllowedFilter>) -> Self {
        self.filters = Registry::new(filters);
        self
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<AllowedScope>) -> Self {
        self.scopes = Registry::new(scopes);
        self
    }

    #[must_use]
    pub fn with_sorts(mut self, sorts: Vec<AllowedSort>) -> Self {
        self.sorts = Registry::new(sorts);
        self
    }

    #[must_use]
    pub fn with_searchable(mut self, fields: Vec<&str>) -> Self {
        self.searchable = fields.into_iter().map(str::to_string).collect();
        self
    }

    #[must_use]
    pub fn with_dates(mut self, columns: Vec<&str>) -> Self {
        self.dates = columns.into_iter().map(str::to_string).collect();
        self
    }

    #[must_use]
    pub fn with_soft_deletes(mut self, column: Option<&str>) -> Self {
        self.soft_delete_column = column.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_relations(mut self, resolve: fn(&str) -> Option<Relation>) -> Self {
        self.relations = resolve;
        self
    }

    /// Reject duplicate whitelist entries.
    pub fn check(self) -> Result<Self, SearchError> {
        self.filters.check()?;
        self.scopes.check()?;
        self.sorts.check()?;
        Ok(self)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn filters(&self) -> &Registry<AllowedFilter> {
        &self.filters
    }

    #[must_use]
    pub fn scopes(&self) -> &Registry<AllowedScope> {
        &self.scopes
    }

    #[must_use]
    pub fn sorts(&self) -> &Registry<AllowedSort> {
        &self.sorts
    }

    #[must_use]
    pub fn is_date_column(&self, column: &str) -> bool {
        self.dates.iter().any(|date| date == column)
    }

    /// Look up a relation, failing when the resource does not define it.
    pub fn relation(&self, name: &str) -> Result<Relation, SearchError> {
        (self.relations)(name).ok_or_else(|| SearchError::unknown_relation(&self.name, name))
    }
}

impl fmt::Debug for ResourceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDefinition")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("filters", &self.filters.names().collect::<Vec<_>>())
            .field("scopes", &self.scopes.names().collect::<Vec<_>>())
            .field("sorts", &self.sorts.names().collect::<Vec<_>>())
            .field("searchable", &self.searchable)
            .field("dates", &self.dates)
            .field("soft_delete_column", &self.soft_delete_column)
            .finish_non_exhaustive()
    }
}
