//! News repository
//!
//! Database operations for news articles, including the filtered search
//! query and maintenance of the tag association table.

use crate::models::{CreateNewsInput, News, NewsSearchParams, Tag, UpdateNewsInput};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use std::sync::Arc;

/// News repository trait
#[async_trait]
pub trait NewsRepository: Send + Sync {
    /// Insert a new article owned by the given author
    async fn create(&self, input: &CreateNewsInput, author_id: i64) -> Result<News>;

    /// Get article by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<News>>;

    /// Get article by slug
    async fn find_by_slug(&self, slug: &str) -> Result<Option<News>>;

    /// Apply the fields present in the input; absent fields stay untouched
    async fn update(&self, id: i64, input: &UpdateNewsInput) -> Result<News>;

    /// Hard delete; join rows go with the article
    async fn delete(&self, id: i64) -> Result<()>;

    /// Filtered, paginated listing over published articles
    async fn search(&self, params: &NewsSearchParams) -> Result<Vec<News>>;

    /// Count of matches for the same filters as `search`
    async fn count_search(&self, params: &NewsSearchParams) -> Result<i64>;

    /// Bump the view counter by one
    async fn increment_view_count(&self, id: i64) -> Result<()>;

    /// Replace the article's tag set wholesale
    async fn replace_tags(&self, news_id: i64, tag_ids: &[i64]) -> Result<()>;

    /// Tags currently associated with the article
    async fn tags_for(&self, news_id: i64) -> Result<Vec<Tag>>;
}

/// sqlx-backed news repository
pub struct SqlxNewsRepository {
    pool: SqlitePool,
}

impl SqlxNewsRepository {
    /// Create a new repository over the given pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn NewsRepository> {
        Arc::new(Self::new(pool))
    }
}

const NEWS_COLUMNS: &str = "id, title, slug, summary, content, cover_image, video_url, is_published, is_featured, is_breaking, view_count, like_count, comment_count, author_id, category_id, created_at, updated_at";

/// Append the search predicates to a query.
///
/// Every filter is optional and AND-combined; the published restriction is
/// unconditional. The same function feeds the listing and the count query so
/// the two can never disagree.
fn push_search_filters<'a>(builder: &mut QueryBuilder<'a, Sqlite>, params: &'a NewsSearchParams) {
    builder.push(" WHERE is_published = 1");

    if let Some(q) = params.q.as_deref().filter(|q| !q.is_empty()) {
        let pattern = format!("%{}%", q.to_lowercase());
        builder
            .push(" AND (LOWER(title) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(COALESCE(summary, '')) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(content) LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(category_id) = params.category_id {
        builder.push(" AND category_id = ").push_bind(category_id);
    }

    if !params.tag_ids.is_empty() {
        // Any-tag semantics: one shared tag is enough to match
        builder.push(" AND EXISTS (SELECT 1 FROM news_tags nt WHERE nt.news_id = news.id AND nt.tag_id IN (");
        let mut separated = builder.separated(", ");
        for tag_id in &params.tag_ids {
            separated.push_bind(*tag_id);
        }
        builder.push("))");
    }

    if let Some(is_featured) = params.is_featured {
        builder.push(" AND is_featured = ").push_bind(is_featured);
    }

    if let Some(is_breaking) = params.is_breaking {
        builder.push(" AND is_breaking = ").push_bind(is_breaking);
    }
}

#[async_trait]
impl NewsRepository for SqlxNewsRepository {
    async fn create(&self, input: &CreateNewsInput, author_id: i64) -> Result<News> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO news (title, slug, summary, content, cover_image, video_url, is_published, is_featured, is_breaking, author_id, category_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&input.title)
        .bind(&input.slug)
        .bind(&input.summary)
        .bind(&input.content)
        .bind(&input.cover_image)
        .bind(&input.video_url)
        .bind(input.is_published)
        .bind(input.is_featured)
        .bind(input.is_breaking)
        .bind(author_id)
        .bind(input.category_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create article")?;

        let id = result.last_insert_rowid();

        if !input.tag_ids.is_empty() {
            self.replace_tags(id, &input.tag_ids).await?;
        }

        Ok(News {
            id,
            title: input.title.clone(),
            slug: input.slug.clone(),
            summary: input.summary.clone(),
            content: input.content.clone(),
            cover_image: input.cover_image.clone(),
            video_url: input.video_url.clone(),
            is_published: input.is_published,
            is_featured: input.is_featured,
            is_breaking: input.is_breaking,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            author_id,
            category_id: input.category_id,
            created_at: now,
            updated_at: now,
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<News>> {
        let row = sqlx::query(&format!("SELECT {} FROM news WHERE id = ?", NEWS_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get article by ID")?;

        row.as_ref().map(row_to_news).transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<News>> {
        let row = sqlx::query(&format!("SELECT {} FROM news WHERE slug = ?", NEWS_COLUMNS))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get article by slug")?;

        row.as_ref().map(row_to_news).transpose()
    }

    async fn update(&self, id: i64, input: &UpdateNewsInput) -> Result<News> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Article not found"))?;

        let now = Utc::now();
        let title = input.title.as_ref().unwrap_or(&existing.title);
        let slug = input.slug.as_ref().unwrap_or(&existing.slug);
        let content = input.content.as_ref().unwrap_or(&existing.content);
        let category_id = input.category_id.unwrap_or(existing.category_id);
        let is_published = input.is_published.unwrap_or(existing.is_published);
        let is_featured = input.is_featured.unwrap_or(existing.is_featured);
        let is_breaking = input.is_breaking.unwrap_or(existing.is_breaking);

        // Double-Option fields: absent keeps the stored value, explicit null clears it
        let summary = match &input.summary {
            Some(value) => value.clone(),
            None => existing.summary.clone(),
        };
        let cover_image = match &input.cover_image {
            Some(value) => value.clone(),
            None => existing.cover_image.clone(),
        };
        let video_url = match &input.video_url {
            Some(value) => value.clone(),
            None => existing.video_url.clone(),
        };

        sqlx::query(
            r#"
            UPDATE news
            SET title = ?, slug = ?, summary = ?, content = ?, cover_image = ?, video_url = ?, is_published = ?, is_featured = ?, is_breaking = ?, category_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(title)
        .bind(slug)
        .bind(&summary)
        .bind(content)
        .bind(&cover_image)
        .bind(&video_url)
        .bind(is_published)
        .bind(is_featured)
        .bind(is_breaking)
        .bind(category_id)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update article")?;

        if let Some(tag_ids) = &input.tag_ids {
            self.replace_tags(id, tag_ids).await?;
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Article not found after update"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        // news_tags rows are removed by ON DELETE CASCADE
        sqlx::query("DELETE FROM news WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete article")?;
        Ok(())
    }

    async fn search(&self, params: &NewsSearchParams) -> Result<Vec<News>> {
        let mut builder =
            QueryBuilder::new(format!("SELECT {} FROM news", NEWS_COLUMNS));
        push_search_filters(&mut builder, params);
        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(params.limit())
            .push(" OFFSET ")
            .push_bind(params.offset());

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to search articles")?;

        rows.iter().map(row_to_news).collect()
    }

    async fn count_search(&self, params: &NewsSearchParams) -> Result<i64> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) as count FROM news");
        push_search_filters(&mut builder, params);

        let row = builder
            .build()
            .fetch_one(&self.pool)
            .await
            .context("Failed to count search results")?;

        Ok(row.get("count"))
    }

    async fn increment_view_count(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE news SET view_count = view_count + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to increment view count")?;
        Ok(())
    }

    async fn replace_tags(&self, news_id: i64, tag_ids: &[i64]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start transaction")?;

        sqlx::query("DELETE FROM news_tags WHERE news_id = ?")
            .bind(news_id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear tag associations")?;

        for tag_id in tag_ids {
            sqlx::query("INSERT OR IGNORE INTO news_tags (news_id, tag_id) VALUES (?, ?)")
                .bind(news_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await
                .context("Failed to insert tag association")?;
        }

        tx.commit().await.context("Failed to commit tag replacement")?;
        Ok(())
    }

    async fn tags_for(&self, news_id: i64) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name, t.slug, t.color, t.created_at, t.updated_at
            FROM tags t
            INNER JOIN news_tags nt ON t.id = nt.tag_id
            WHERE nt.news_id = ?
            ORDER BY t.id
            "#,
        )
        .bind(news_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list article tags")?;

        Ok(rows
            .iter()
            .map(|row| Tag {
                id: row.get("id"),
                name: row.get("name"),
                slug: row.get("slug"),
                color: row.get("color"),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            })
            .collect())
    }
}

fn row_to_news(row: &sqlx::sqlite::SqliteRow) -> Result<News> {
    Ok(News {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        summary: row.get("summary"),
        content: row.get("content"),
        cover_image: row.get("cover_image"),
        video_url: row.get("video_url"),
        is_published: row.get("is_published"),
        is_featured: row.get("is_featured"),
        is_breaking: row.get("is_breaking"),
        view_count: row.get("view_count"),
        like_count: row.get("like_count"),
        comment_count: row.get("comment_count"),
        author_id: row.get("author_id"),
        category_id: row.get("category_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
