//! Tests against a live Postgres.
//!
//! Run with: POSTGRES_URI=postgresql://postgres@localhost:5432/postgres?sslmode=disable cargo test -- --ignored

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use futures::future::join_all;
use serial_test::serial;
use sqlx::PgPool;

use twelvefactor::app::build_app;
use twelvefactor::services::users::{PgUserStore, User, UserStore, UsersConfig, UsersService};
use twelvefactor::store::{self, StoreSettings};
use twelvefactor::Config;

use common::{get, logger};

async fn setup_database(count: usize) -> (PgPool, Arc<PgUserStore>) {
    let uri = std::env::var("POSTGRES_URI").expect("POSTGRES_URI required");
    let settings = StoreSettings {
        uri,
        max_lifetime: Duration::ZERO,
        max_open: 10,
        max_idle: 2,
    };
    let pool = store::connect(&settings).await.expect("database unreachable");
    let users = Arc::new(PgUserStore::new(pool.clone()));

    users.create_table().await.unwrap();
    users.delete_many().await.unwrap();
    for _ in 0..count {
        users.insert_one("fred").await.unwrap();
    }
    (pool, users)
}

fn config(limit: u32) -> Config {
    Config {
        users_select_limit: limit,
        req_timeout: Duration::from_secs(5),
        ..Config::default()
    }
}

fn decode(body: &[u8]) -> Vec<User> {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
#[serial]
#[ignore = "requires database"]
async fn get_returns_ten_inserted_users() {
    let (pool, users) = setup_database(10).await;
    let app = build_app(&config(10), users, &logger()).await.unwrap();

    let (status, body) = get(&app, "http://localhost:9090/users").await;
    assert!(status.as_u16() < 300);
    assert_eq!(decode(&body).len(), 10);
    pool.close().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires database"]
async fn listing_is_newest_first_and_bounded() {
    let (pool, users) = setup_database(15).await;
    let app = build_app(&config(7), users, &logger()).await.unwrap();

    let (status, body) = get(&app, "/users").await;
    assert_eq!(status, StatusCode::OK);
    let rows = decode(&body);
    assert_eq!(rows.len(), 7);
    assert!(rows.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    pool.close().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires database"]
async fn insert_returns_generated_ids() {
    let (pool, users) = setup_database(0).await;
    let first = users.insert_one("alice").await.unwrap();
    let second = users.insert_one("bob").await.unwrap();
    assert!(second > first);
    assert_eq!(users.delete_many().await.unwrap(), 2);
    pool.close().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires database"]
async fn schema_creation_is_idempotent() {
    let (pool, users) = setup_database(3).await;

    for _ in 0..3 {
        UsersService::new(UsersConfig {
            store: users.clone(),
            path_prefix: "users".to_string(),
            select_limit: 10,
            logger: logger(),
        })
        .await
        .unwrap();
    }

    assert_eq!(users.select_many(10).await.unwrap().len(), 3);
    pool.close().await;
}

#[tokio::test]
#[serial]
#[ignore = "requires database"]
async fn concurrent_requests_see_consistent_pages() {
    let (pool, users) = setup_database(12).await;
    let app = build_app(&config(10), users, &logger()).await.unwrap();

    let responses = join_all((0..20).map(|_| get(&app, "/users"))).await;
    for (status, body) in responses {
        assert_eq!(status, StatusCode::OK);
        assert_eq!(decode(&body).len(), 10);
    }
    pool.close().await;
}
