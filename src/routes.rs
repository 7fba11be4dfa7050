use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{MethodRouter, post},
};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use serde_json::Value;

use crate::config::SearchConfig;
use crate::errors::SearchError;
use crate::filtering::pagination::calculate_content_range;
use crate::models::SearchResults;
use crate::resource::SearchResource;

type Model<R> = <<R as SearchResource>::EntityType as EntityTrait>::Model;

/// State shared by the search handlers.
#[derive(Clone)]
pub struct SearchState {
    pub db: DatabaseConnection,
    pub config: Arc<SearchConfig>,
}

impl SearchState {
    #[must_use]
    pub fn new(db: DatabaseConnection, config: SearchConfig) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// `POST` handler: run a search request against resource `R`.
///
/// An empty body is the empty request. The page window is echoed in a
/// `Content-Range` header (`posts 0-29/120`).
pub async fn search<R>(
    State(state): State<SearchState>,
    body: Bytes,
) -> Result<(HeaderMap, Json<SearchResults<Model<R>>>), SearchError>
where
    R: SearchResource,
    Model<R>: Serialize,
{
    let payload: Value = if body.is_empty() {
        Value::Object(serde_json::Map::new())
    } else {
        serde_json::from_slice(&body).map_err(SearchError::Malformed)?
    };

    let results = R::search(&state.db, &state.config, &payload).await?;
    let headers = calculate_content_range(results.offset, results.limit, results.total, R::RESOURCE_NAME);
    Ok((headers, Json(results)))
}

/// Method router mounting [`search`] for `R`, e.g. `.route("/posts/search", search_route::<Posts>())`.
pub fn search_route<R>() -> MethodRouter<SearchState>
where
    R: SearchResource,
    Model<R>: Serialize,
{
    post(search::<R>)
}
