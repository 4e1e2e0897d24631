//! Test utilities for database operations.
//!
//! Provides an in-memory `SQLite` database with the full schema applied, so
//! services and routes can be exercised against real constraints (unique
//! pairs, cascading deletes) without an external server. Enable the
//! `test-utils` feature to get the `SQLite` driver.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, DbErr, Set};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::entities::{movie, user};
use crate::migrations::Migrator;

/// A migrated in-memory database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: Arc<DatabaseConnection>,
    seq: std::sync::atomic::AtomicU32,
}

impl TestDatabase {
    /// Create a fresh in-memory database and run all migrations.
    ///
    /// The pool is pinned to a single connection: every `SQLite` memory
    /// connection is its own database.
    pub async fn new() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).min_connections(1).sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;

        info!("Created in-memory test database");

        Ok(Self {
            conn: Arc::new(conn),
            seq: std::sync::atomic::AtomicU32::new(0),
        })
    }

    /// Get a shared handle to the connection.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.seq.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        format!("{prefix}{n:04}")
    }

    /// Insert a user whose access token is `{username}-token`.
    pub async fn insert_user(&self, username: &str) -> Result<user::Model, DbErr> {
        user::ActiveModel {
            id: Set(self.next_id("u")),
            username: Set(username.to_string()),
            token: Set(Some(format!("{username}-token"))),
            created_at: Set(Utc::now().fixed_offset()),
        }
        .insert(self.conn.as_ref())
        .await
    }

    /// Insert a movie with placeholder price, description and image.
    pub async fn insert_movie(&self, name: &str) -> Result<movie::Model, DbErr> {
        movie::ActiveModel {
            id: Set(self.next_id("m")),
            name: Set(name.to_string()),
            price: Set(10),
            description: Set(format!("About {name}")),
            image: Set("movie_images/placeholder.jpg".to_string()),
        }
        .insert(self.conn.as_ref())
        .await
    }
}

/// A fixed timestamp `seconds` after 2025-01-01T00:00:00Z, for ordering tests.
#[must_use]
pub fn at(seconds: i64) -> DateTime<FixedOffset> {
    DateTime::from_timestamp(1_735_689_600 + seconds, 0)
        .unwrap_or_default()
        .fixed_offset()
}
