//! Validate client search requests and compile them into Sea-ORM queries.
//!
//! A resource declares what clients may touch (filters, scopes, sorts, searchable
//! fields and relations) by implementing [`SearchResource`]. A JSON payload is then
//! validated against those whitelists by [`SearchRequestValidator`] and turned into a
//! `Select` by [`SearchQueryBuilder`]:
//!
//! ```rust,ignore
//! let config = SearchConfig::from_env();
//! let page = PostResource::search(&db, &config, &json!({
//!     "filters": [{"field": "title", "operator": "like", "value": "%rust%"}],
//!     "sort": [{"field": "user.name", "direction": "desc"}]
//! }))
//! .await?;
//! ```
//!
//! [`routes::search_route`] mounts the same pipeline as an axum `POST` handler.

pub mod allowed;
pub mod builder;
pub mod config;
pub mod errors;
pub mod filtering;
pub mod models;
pub mod relation;
pub mod resource;
pub mod routes;
pub mod validation;
pub mod validator;

pub use allowed::{AllowedFilter, AllowedScope, AllowedSort, Aliasable, DescriptorKind, Registry, ValueRule};
pub use builder::{SearchQuery, SearchQueryBuilder};
pub use config::SearchConfig;
pub use errors::SearchError;
pub use filtering::Operator;
pub use models::{
    FilterNode, FilterType, PageDescriptor, ScopeDescriptor, SearchDescriptor, SearchRequest, SearchResults,
    SortDescriptor, SortDirection,
};
pub use relation::Relation;
pub use resource::{ResourceDefinition, SearchResource};
pub use routes::{SearchState, search_route};
pub use validation::{ValidationError, ValidationErrors, ValidationKind};
pub use validator::SearchRequestValidator;
