//! Tag repository

use crate::models::{CreateTagInput, Tag};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Tag repository trait
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Insert a new tag and return it with its assigned id
    async fn create(&self, input: &CreateTagInput) -> Result<Tag>;

    /// Get tag by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Tag>>;

    /// Get tag by name
    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>>;

    /// Get tag by slug
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>>;

    /// List all tags
    async fn list(&self) -> Result<Vec<Tag>>;
}

/// sqlx-backed tag repository
pub struct SqlxTagRepository {
    pool: SqlitePool,
}

impl SqlxTagRepository {
    /// Create a new repository over the given pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn TagRepository> {
        Arc::new(Self::new(pool))
    }
}

const TAG_COLUMNS: &str = "id, name, slug, color, created_at, updated_at";

#[async_trait]
impl TagRepository for SqlxTagRepository {
    async fn create(&self, input: &CreateTagInput) -> Result<Tag> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO tags (name, slug, color, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&input.name)
        .bind(&input.slug)
        .bind(&input.color)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create tag")?;

        Ok(Tag {
            id: result.last_insert_rowid(),
            name: input.name.clone(),
            slug: input.slug.clone(),
            color: input.color.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Tag>> {
        let row = sqlx::query(&format!("SELECT {} FROM tags WHERE id = ?", TAG_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get tag by ID")?;

        row.as_ref().map(row_to_tag).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let row = sqlx::query(&format!("SELECT {} FROM tags WHERE name = ?", TAG_COLUMNS))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get tag by name")?;

        row.as_ref().map(row_to_tag).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        let row = sqlx::query(&format!("SELECT {} FROM tags WHERE slug = ?", TAG_COLUMNS))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get tag by slug")?;

        row.as_ref().map(row_to_tag).transpose()
    }

    async fn list(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query(&format!("SELECT {} FROM tags ORDER BY name", TAG_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list tags")?;

        rows.iter().map(row_to_tag).collect()
    }
}

fn row_to_tag(row: &sqlx::sqlite::SqliteRow) -> Result<Tag> {
    Ok(Tag {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        color: row.get("color"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
