//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, TimeZone, Utc};
use tower::ServiceExt;

use twelvefactor::services::users::{User, UserStore};
use twelvefactor::{Config, Logger};

/// In-memory `UserStore` with failure and latency injection.
pub struct MemoryUserStore {
    rows: Mutex<Vec<User>>,
    next_id: AtomicI32,
    epoch: DateTime<Utc>,
    select_delay: Duration,
    fail_selects: AtomicBool,
    fail_create: AtomicBool,
    pub create_calls: AtomicUsize,
    pub completed_selects: AtomicUsize,
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::with_delay(Duration::ZERO)
    }
}

impl MemoryUserStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delay(select_delay: Duration) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(1),
            epoch: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            select_delay,
            fail_selects: AtomicBool::new(false),
            fail_create: AtomicBool::new(false),
            create_calls: AtomicUsize::new(0),
            completed_selects: AtomicUsize::new(0),
        }
    }

    pub fn fail_selects(&self) {
        self.fail_selects.store(true, Ordering::SeqCst);
    }

    pub fn fail_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    /// Inserts a row with an explicit creation time.
    pub fn insert_at(&self, username: &str, created_at: DateTime<Utc>) -> i32 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.rows.lock().unwrap().push(User {
            id,
            username: username.to_string(),
            created_at,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_table(&self) -> Result<(), sqlx::Error> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(sqlx::Error::Protocol("permission denied for schema public".into()));
        }
        Ok(())
    }

    async fn insert_one(&self, username: &str) -> Result<i32, sqlx::Error> {
        let offset = i64::from(self.next_id.load(Ordering::SeqCst));
        let created_at = self.epoch + chrono::Duration::seconds(offset);
        Ok(self.insert_at(username, created_at))
    }

    async fn select_many(&self, limit: i64) -> Result<Vec<User>, sqlx::Error> {
        if !self.select_delay.is_zero() {
            tokio::time::sleep(self.select_delay).await;
        }
        if self.fail_selects.load(Ordering::SeqCst) {
            return Err(sqlx::Error::Protocol("relation \"users\" does not exist".into()));
        }
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        self.completed_selects.fetch_add(1, Ordering::SeqCst);
        Ok(rows)
    }

    async fn delete_many(&self) -> Result<u64, sqlx::Error> {
        let mut rows = self.rows.lock().unwrap();
        let removed = rows.len() as u64;
        rows.clear();
        Ok(removed)
    }
}

pub fn logger() -> Logger {
    Logger::new("app-test".to_string())
}

pub fn config() -> Config {
    Config::default()
}

pub async fn populate(store: &dyn UserStore, count: usize) {
    for i in 0..count {
        store.insert_one(&format!("user-{i}")).await.unwrap();
    }
}

pub async fn get(router: &Router, uri: &str) -> (StatusCode, Bytes) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body)
}
