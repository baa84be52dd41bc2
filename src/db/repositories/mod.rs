//! Database repositories
//!
//! Trait-based data access for the Newswire entities. Each repository pairs
//! a trait (the interface services depend on) with a sqlx implementation
//! bound to the shared pool.

pub mod category;
pub mod news;
pub mod tag;
pub mod user;

pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use news::{NewsRepository, SqlxNewsRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use user::{SqlxUserRepository, UserRepository};
