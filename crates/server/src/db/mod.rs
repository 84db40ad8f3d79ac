//! Database operations for the `PostgreSQL` store.
//!
//! # Tables
//!
//! - `product` - Catalog entries (managed externally, read-only here)
//! - `static_asset` - Named images served to the mini-program
//! - `user_selection` - Append-only selection events with snapshots
//! - `wechat_user` - Registered users, unique on openid and phone number
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and embedded via
//! `sqlx::migrate!`; they run once at startup.

pub mod products;
pub mod selections;
pub mod wechat_users;

pub use products::ProductRepository;
pub use selections::{SelectionGroup, SelectionRepository};
pub use wechat_users::WechatUserRepository;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Unique constraint violation.
    #[error("{0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
