//! News service
//!
//! Business logic for articles, categories and tags:
//! - Article CRUD with slug uniqueness and referential checks
//! - Filtered, paginated search over published articles
//! - View-count side effect on the single-article read path
//! - Category and tag management

use crate::db::repositories::{CategoryRepository, NewsRepository, TagRepository};
use crate::models::{
    Category, CreateCategoryInput, CreateNewsInput, CreateTagInput, News, NewsPage,
    NewsSearchParams, Tag, UpdateNewsInput,
};
use std::sync::Arc;

/// Error types for news service operations
#[derive(Debug, thiserror::Error)]
pub enum NewsServiceError {
    /// A unique field is already taken
    #[error("{0}")]
    Conflict(String),

    /// Invalid input
    #[error("{0}")]
    Validation(String),

    /// Article, category or tag does not exist
    #[error("{0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// News service over the news, category and tag repositories
pub struct NewsService {
    news_repo: Arc<dyn NewsRepository>,
    category_repo: Arc<dyn CategoryRepository>,
    tag_repo: Arc<dyn TagRepository>,
}

impl NewsService {
    /// Create a new news service
    pub fn new(
        news_repo: Arc<dyn NewsRepository>,
        category_repo: Arc<dyn CategoryRepository>,
        tag_repo: Arc<dyn TagRepository>,
    ) -> Self {
        Self {
            news_repo,
            category_repo,
            tag_repo,
        }
    }

    /// Create an article for the given author.
    ///
    /// Rejects a duplicate slug with a conflict and a missing category with
    /// a validation error before inserting.
    pub async fn create(
        &self,
        input: CreateNewsInput,
        author_id: i64,
    ) -> Result<News, NewsServiceError> {
        if input.title.is_empty() || input.slug.is_empty() || input.content.is_empty() {
            return Err(NewsServiceError::Validation(
                "Title, slug and content must not be empty".to_string(),
            ));
        }

        if self.news_repo.find_by_slug(&input.slug).await?.is_some() {
            return Err(NewsServiceError::Conflict(
                "An article with this slug already exists".to_string(),
            ));
        }

        if self
            .category_repo
            .find_by_id(input.category_id)
            .await?
            .is_none()
        {
            return Err(NewsServiceError::Validation(
                "Category does not exist".to_string(),
            ));
        }

        let created = self.news_repo.create(&input, author_id).await?;
        tracing::info!(news_id = created.id, author_id, "Created article");
        Ok(created)
    }

    /// Get an article by id without side effects
    pub async fn get(&self, id: i64) -> Result<News, NewsServiceError> {
        self.news_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| NewsServiceError::NotFound("Article not found".to_string()))
    }

    /// Get an article by id, counting the view.
    ///
    /// The increment is unconditional and persisted immediately; repeated
    /// reads by the same client all count. The returned article reflects
    /// the incremented counter.
    pub async fn get_with_view(&self, id: i64) -> Result<News, NewsServiceError> {
        // Existence check first so a miss stays a plain 404
        self.get(id).await?;
        self.news_repo.increment_view_count(id).await?;
        self.get(id).await
    }

    /// Apply a partial update.
    ///
    /// A changed slug must still be unique; a changed category must exist.
    /// When `tag_ids` is present the tag set is replaced wholesale.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateNewsInput,
    ) -> Result<News, NewsServiceError> {
        let existing = self.get(id).await?;

        if let Some(slug) = &input.slug {
            if slug != &existing.slug && self.news_repo.find_by_slug(slug).await?.is_some() {
                return Err(NewsServiceError::Conflict(
                    "An article with this slug already exists".to_string(),
                ));
            }
        }

        if let Some(category_id) = input.category_id {
            if self.category_repo.find_by_id(category_id).await?.is_none() {
                return Err(NewsServiceError::Validation(
                    "Category does not exist".to_string(),
                ));
            }
        }

        Ok(self.news_repo.update(id, &input).await?)
    }

    /// Hard-delete an article
    pub async fn delete(&self, id: i64) -> Result<(), NewsServiceError> {
        self.get(id).await?;
        self.news_repo.delete(id).await?;
        tracing::info!(news_id = id, "Deleted article");
        Ok(())
    }

    /// Search published articles.
    ///
    /// Runs the filtered listing and a count query over the same predicates,
    /// then assembles the page metadata.
    pub async fn search(&self, params: &NewsSearchParams) -> Result<NewsPage, NewsServiceError> {
        let total = self.news_repo.count_search(params).await?;
        let items = self.news_repo.search(params).await?;
        Ok(NewsPage::new(items, total, params))
    }

    /// Tags associated with an article
    pub async fn tags_for(&self, news_id: i64) -> Result<Vec<Tag>, NewsServiceError> {
        Ok(self.news_repo.tags_for(news_id).await?)
    }

    /// Get a category by id, regardless of its active flag
    pub async fn get_category(&self, id: i64) -> Result<Option<Category>, NewsServiceError> {
        Ok(self.category_repo.find_by_id(id).await?)
    }

    /// List active categories
    pub async fn list_categories(&self) -> Result<Vec<Category>, NewsServiceError> {
        Ok(self.category_repo.list_active().await?)
    }

    /// Create a category; name and slug must both be unused
    pub async fn create_category(
        &self,
        input: CreateCategoryInput,
    ) -> Result<Category, NewsServiceError> {
        if input.name.is_empty() || input.slug.is_empty() {
            return Err(NewsServiceError::Validation(
                "Name and slug must not be empty".to_string(),
            ));
        }
        if self.category_repo.find_by_name(&input.name).await?.is_some() {
            return Err(NewsServiceError::Conflict(
                "A category with this name already exists".to_string(),
            ));
        }
        if self.category_repo.find_by_slug(&input.slug).await?.is_some() {
            return Err(NewsServiceError::Conflict(
                "A category with this slug already exists".to_string(),
            ));
        }

        Ok(self.category_repo.create(&input).await?)
    }

    /// List all tags
    pub async fn list_tags(&self) -> Result<Vec<Tag>, NewsServiceError> {
        Ok(self.tag_repo.list().await?)
    }

    /// Create a tag; name and slug must both be unused
    pub async fn create_tag(&self, input: CreateTagInput) -> Result<Tag, NewsServiceError> {
        if input.name.is_empty() || input.slug.is_empty() {
            return Err(NewsServiceError::Validation(
                "Name and slug must not be empty".to_string(),
            ));
        }
        if self.tag_repo.find_by_name(&input.name).await?.is_some() {
            return Err(NewsServiceError::Conflict(
                "A tag with this name already exists".to_string(),
            ));
        }
        if self.tag_repo.find_by_slug(&input.slug).await?.is_some() {
            return Err(NewsServiceError::Conflict(
                "A tag with this slug already exists".to_string(),
            ));
        }

        Ok(self.tag_repo.create(&input).await?)
    }
}
