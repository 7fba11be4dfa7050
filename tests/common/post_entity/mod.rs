use sea_orm::entity::prelude::*;
use searchcrate::{AllowedFilter, AllowedScope, AllowedSort, Relation as SearchRelation, SearchError, SearchResource};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub body: Option<String>,
    pub tracking_id: Option<i32>,
    pub publish_at: Option<String>,
    pub meta: Option<String>,
    /// JSON array of label strings
    pub labels: Option<String>,
    pub user_id: Option<i32>,
    pub created_at: Option<String>,
    pub deleted_at: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub struct PostResource;

impl SearchResource for PostResource {
    type EntityType = Entity;
    const RESOURCE_NAME: &'static str = "posts";

    fn allowed_scopes() -> Vec<AllowedScope> {
        vec![
            AllowedScope::named("specialMetaAliasName").mapped_to("withMeta"),
            AllowedScope::named("publishedAt"),
        ]
    }

    fn allowed_filters() -> Vec<AllowedFilter> {
        vec![
            AllowedFilter::string("myTitleAlias").mapped_to("title"),
            AllowedFilter::string("title"),
            AllowedFilter::number("tracking_id"),
            AllowedFilter::timestamp("publish_at"),
            AllowedFilter::json("labels"),
            AllowedFilter::string("user.name"),
            AllowedFilter::string("tag").mapped_to("tags.name"),
            AllowedFilter::string("owner").mapped_to("owner.name"),
            AllowedFilter::string("ghost").mapped_to("ghost.name"),
        ]
    }

    fn allowed_sorts() -> Vec<AllowedSort> {
        vec![
            AllowedSort::field("id"),
            AllowedSort::field("title"),
            AllowedSort::field("author").mapped_to("user.name"),
            AllowedSort::field("author_email").mapped_to("user.email"),
            AllowedSort::field("owner").mapped_to("owner.name"),
        ]
    }

    fn searchable_by() -> Vec<&'static str> {
        vec!["title", "body", "user.email"]
    }

    fn date_columns() -> Vec<&'static str> {
        vec!["publish_at", "created_at"]
    }

    fn soft_delete_column() -> Option<&'static str> {
        Some("deleted_at")
    }

    fn relation(name: &str) -> Option<SearchRelation> {
        match name {
            "user" => Some(SearchRelation::belongs_to("users", "user_id", "id")),
            "tags" => Some(SearchRelation::belongs_to_many("tags", "post_tag", "post_id", "tag_id", "id", "id")),
            "owner" => Some(SearchRelation::morph_to()),
            _ => None,
        }
    }

    fn apply_scope(query: Select<Entity>, scope: &str, args: &[serde_json::Value]) -> Result<Select<Entity>, SearchError> {
        match scope {
            "withMeta" => Ok(query.filter(Column::Meta.is_not_null())),
            "publishedAt" => {
                let Some(day) = args.first().and_then(serde_json::Value::as_str) else {
                    return Err(SearchError::invalid_scope_arguments(scope, "expected a date"));
                };
                Ok(query.filter(Column::PublishAt.starts_with(day)))
            }
            other => Err(SearchError::invalid_scope(other, "scope is not implemented")),
        }
    }
}

/// Declares `title` twice, which the registry rejects.
pub struct MisconfiguredPostResource;

impl SearchResource for MisconfiguredPostResource {
    type EntityType = Entity;
    const RESOURCE_NAME: &'static str = "posts";

    fn allowed_filters() -> Vec<AllowedFilter> {
        vec![AllowedFilter::string("title"), AllowedFilter::number("title")]
    }
}
