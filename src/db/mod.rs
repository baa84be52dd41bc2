//! Database layer
//!
//! SQLite access for the Newswire backend:
//! - `pool`: explicit connection-pool construction and health check
//! - `migrations`: embedded, versioned schema migrations
//! - `repositories`: trait-based data access for users, news, categories
//!   and tags
//!
//! Repositories are the seam between services and SQL: services depend on
//! the repository traits and receive sqlx-backed implementations at startup.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, ping};
