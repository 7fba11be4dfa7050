#![allow(dead_code)]

use axum::Router;
use sea_orm::{ActiveValue::Set, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema};
use sea_orm_migration::prelude::*;
use searchcrate::{SearchConfig, SearchState, search_route};

pub mod post_entity;
pub mod tag_entity;
pub mod user_entity;

use post_entity::{MisconfiguredPostResource, PostResource};
use tag_entity::post_tag;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Fresh database filled with [`seed`].
pub async fn setup_seeded_db() -> Result<DatabaseConnection, DbErr> {
    let db = setup_test_db().await?;
    seed(&db).await?;
    Ok(db)
}

pub fn setup_test_app(db: DatabaseConnection, config: SearchConfig) -> Router {
    let api = Router::new()
        .route("/posts/search", search_route::<PostResource>())
        .route("/broken/search", search_route::<MisconfiguredPostResource>())
        .with_state(SearchState::new(db, config));

    Router::new().nest("/api/v1", api)
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateSearchTables)]
    }
}

pub struct CreateSearchTables;

#[async_trait::async_trait]
impl MigrationName for CreateSearchTables {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_search_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateSearchTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());
        manager.create_table(schema.create_table_from_entity(user_entity::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(post_entity::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(tag_entity::Entity)).await?;
        manager.create_table(schema.create_table_from_entity(post_tag::Entity)).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in ["post_tag", "tags", "posts", "users"] {
            manager.drop_table(Table::drop().table(Alias::new(table)).to_owned()).await?;
        }
        Ok(())
    }
}

/// One seeded post.
#[derive(Default)]
pub struct PostSeed {
    pub id: i32,
    pub title: &'static str,
    pub body: Option<&'static str>,
    pub tracking_id: Option<i32>,
    pub publish_at: Option<&'static str>,
    pub meta: Option<&'static str>,
    pub labels: Option<&'static str>,
    pub user_id: Option<i32>,
    pub deleted_at: Option<&'static str>,
}

impl PostSeed {
    pub fn into_active_model(self) -> post_entity::ActiveModel {
        post_entity::ActiveModel {
            id: Set(self.id),
            title: Set(self.title.to_string()),
            body: Set(self.body.map(str::to_string)),
            tracking_id: Set(self.tracking_id),
            publish_at: Set(self.publish_at.map(str::to_string)),
            meta: Set(self.meta.map(str::to_string)),
            labels: Set(self.labels.map(str::to_string)),
            user_id: Set(self.user_id),
            created_at: Set(self.publish_at.map(str::to_string)),
            deleted_at: Set(self.deleted_at.map(str::to_string)),
        }
    }
}

/// Fixture shared by the integration tests.
///
/// | id | title          | body            | tracking | publish_at          | meta | labels        | user | deleted |
/// |----|----------------|-----------------|----------|---------------------|------|---------------|------|---------|
/// | 1  | First example  | An example body | 1        | 2019-01-01 10:00:00 | yes  | rust, db      | Ann  |         |
/// | 2  | Second example | Nothing here    | 2        | 2019-01-02 12:00:00 |      | rust          | Bob  |         |
/// | 3  | Third          | another example |          | 2019-01-03 08:00:00 | yes  | db            | Ann  |         |
/// | 4  | Fourth example |                 | 4        | 2019-01-04 09:00:00 |      |               |      |         |
/// | 5  | Fifth          | plain           | 5        |                     |      | (empty)       | Bob  |         |
/// | 6  | Deleted example| gone            | 6        | 2019-01-05 00:00:00 |      |               | Ann  | yes     |
///
/// Ann's email is on `example.com`, Bob's on `test.org`. Tags: post 1 has rust and
/// db, post 2 has rust (no `added_at`), post 3 has db.
pub async fn seed(db: &impl ConnectionTrait) -> Result<(), DbErr> {
    user_entity::Entity::insert_many([
        user_entity::ActiveModel {
            id: Set(1),
            name: Set("Ann".to_string()),
            email: Set("ann@example.com".to_string()),
        },
        user_entity::ActiveModel {
            id: Set(2),
            name: Set("Bob".to_string()),
            email: Set("bob@test.org".to_string()),
        },
    ])
    .exec_without_returning(db)
    .await?;

    let posts = [
        PostSeed {
            id: 1,
            title: "First example",
            body: Some("An example body"),
            tracking_id: Some(1),
            publish_at: Some("2019-01-01 10:00:00"),
            meta: Some(r#"{"featured":true}"#),
            labels: Some(r#"["rust","db"]"#),
            user_id: Some(1),
            ..PostSeed::default()
        },
        PostSeed {
            id: 2,
            title: "Second example",
            body: Some("Nothing here"),
            tracking_id: Some(2),
            publish_at: Some("2019-01-02 12:00:00"),
            labels: Some(r#"["rust"]"#),
            user_id: Some(2),
            ..PostSeed::default()
        },
        PostSeed {
            id: 3,
            title: "Third",
            body: Some("another example"),
            publish_at: Some("2019-01-03 08:00:00"),
            meta: Some("{}"),
            labels: Some(r#"["db"]"#),
            user_id: Some(1),
            ..PostSeed::default()
        },
        PostSeed {
            id: 4,
            title: "Fourth example",
            tracking_id: Some(4),
            publish_at: Some("2019-01-04 09:00:00"),
            ..PostSeed::default()
        },
        PostSeed {
            id: 5,
            title: "Fifth",
            body: Some("plain"),
            tracking_id: Some(5),
            labels: Some("[]"),
            user_id: Some(2),
            ..PostSeed::default()
        },
        PostSeed {
            id: 6,
            title: "Deleted example",
            body: Some("gone"),
            tracking_id: Some(6),
            publish_at: Some("2019-01-05 00:00:00"),
            user_id: Some(1),
            deleted_at: Some("2020-01-01 00:00:00"),
            ..PostSeed::default()
        },
    ];
    post_entity::Entity::insert_many(posts.into_iter().map(PostSeed::into_active_model))
        .exec_without_returning(db)
        .await?;

    tag_entity::Entity::insert_many([
        tag_entity::ActiveModel {
            id: Set(1),
            name: Set("rust".to_string()),
        },
        tag_entity::ActiveModel {
            id: Set(2),
            name: Set("db".to_string()),
        },
    ])
    .exec_without_returning(db)
    .await?;

    let links = [
        (1, 1, Some("2020-01-01 00:00:00")),
        (1, 2, Some("2020-02-01 00:00:00")),
        (2, 1, None),
        (3, 2, Some("2020-03-01 00:00:00")),
    ];
    post_tag::Entity::insert_many(links.into_iter().map(|(post_id, tag_id, added_at)| post_tag::ActiveModel {
        post_id: Set(post_id),
        tag_id: Set(tag_id),
        added_at: Set(added_at.map(str::to_string)),
    }))
    .exec_without_returning(db)
    .await?;

    Ok(())
}
