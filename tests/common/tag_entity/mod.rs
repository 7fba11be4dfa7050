use sea_orm::entity::prelude::*;
use sea_orm::sea_query::{Expr, JoinType};
use sea_orm::QueryTrait;
use searchcrate::{AllowedFilter, AllowedSort, SearchQuery, SearchResource};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub mod post_tag {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "post_tag")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub post_id: i32,
        #[sea_orm(primary_key, auto_increment = false)]
        pub tag_id: i32,
        pub added_at: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Tags seen through a post, with `pivot.*` addressing the `post_tag` row.
pub struct PostTagResource;

impl SearchResource for PostTagResource {
    type EntityType = Entity;
    const RESOURCE_NAME: &'static str = "tags";

    fn allowed_filters() -> Vec<AllowedFilter> {
        vec![
            AllowedFilter::string("name"),
            AllowedFilter::timestamp("added_at").mapped_to("pivot.added_at"),
        ]
    }

    fn allowed_sorts() -> Vec<AllowedSort> {
        vec![AllowedSort::field("name"), AllowedSort::field("added_at").mapped_to("pivot.added_at")]
    }

    fn searchable_by() -> Vec<&'static str> {
        vec!["name", "pivot.added_at"]
    }
}

/// Tags of `post_id`, joined through the pivot table.
pub fn tags_of_post(post_id: i32) -> SearchQuery<Entity> {
    let mut select = Entity::find();
    QueryTrait::query(&mut select).join(
        JoinType::InnerJoin,
        post_tag::Entity,
        Expr::col((post_tag::Entity, post_tag::Column::TagId)).equals((Entity, Column::Id)),
    );
    SearchQuery::new(select.filter(post_tag::Column::PostId.eq(post_id))).with_pivot("post_tag")
}
