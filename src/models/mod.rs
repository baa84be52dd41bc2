//! Data models
//!
//! This module contains all data structures used throughout the Newswire
//! backend:
//! - Database entities (User, News, Category, Tag)
//! - Input types for create/update operations
//! - Search and pagination types for the news listing

mod category;
mod news;
mod tag;
mod user;

pub use category::{Category, CreateCategoryInput, UpdateCategoryInput};
pub use news::{CreateNewsInput, News, NewsPage, NewsSearchParams, UpdateNewsInput};
pub use tag::{CreateTagInput, Tag};
pub use user::{CreateUserInput, UpdateUserInput, User};
