//! News API endpoints
//!
//! Handles HTTP requests for news articles:
//! - GET    /api/v1/news/ - Filtered, paginated listing
//! - GET    /api/v1/news/{id} - Single article (counts the view)
//! - POST   /api/v1/news/ - Create article
//! - PUT    /api/v1/news/{id} - Update article (author or superuser)
//! - DELETE /api/v1/news/{id} - Delete article (author or superuser)

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{MessageResponse, NewsListResponse, NewsResponse};
use crate::models::{CreateNewsInput, NewsSearchParams, UpdateNewsInput};

/// Query parameters for the news listing
#[derive(Debug, Deserialize)]
pub struct ListNewsQuery {
    /// Free-text search over title/summary/content
    pub q: Option<String>,
    /// Exact category filter
    pub category_id: Option<i64>,
    /// Comma-separated tag ids; an article matches on any of them
    pub tag_ids: Option<String>,
    pub is_featured: Option<bool>,
    pub is_breaking: Option<bool>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_size() -> u32 {
    10
}

impl ListNewsQuery {
    fn into_params(self) -> Result<NewsSearchParams, ApiError> {
        let mut params = NewsSearchParams::new(self.page, self.size);
        params.q = self.q;
        params.category_id = self.category_id;
        params.is_featured = self.is_featured;
        params.is_breaking = self.is_breaking;

        if let Some(raw) = self.tag_ids.as_deref().filter(|raw| !raw.is_empty()) {
            params.tag_ids = raw
                .split(',')
                .map(|part| part.trim().parse::<i64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| {
                    ApiError::validation_error("tag_ids must be a comma-separated list of ids")
                })?;
        }

        Ok(params)
    }
}

/// GET /api/v1/news/ - Search published articles
pub async fn list_news(
    State(state): State<AppState>,
    Query(query): Query<ListNewsQuery>,
) -> Result<Json<NewsListResponse>, ApiError> {
    let params = query.into_params()?;
    let page = state.news_service.search(&params).await?;

    Ok(Json(NewsListResponse {
        total: page.total,
        page: page.page,
        size: page.size,
        pages: page.pages,
        items: page.items.into_iter().map(Into::into).collect(),
    }))
}

/// GET /api/v1/news/{id} - Single article.
///
/// Every fetch counts as a view; the optional auth layer on this route
/// resolves a user when a token is presented but never rejects.
pub async fn get_news(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<NewsResponse>, ApiError> {
    let news = state.news_service.get_with_view(id).await?;
    let tags = state.news_service.tags_for(id).await?;
    let category = state.news_service.get_category(news.category_id).await?;

    Ok(Json(
        NewsResponse::from(news)
            .with_category(category)
            .with_tags(tags),
    ))
}

/// POST /api/v1/news/ - Create an article owned by the caller
pub async fn create_news(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(body): Json<CreateNewsInput>,
) -> Result<impl IntoResponse, ApiError> {
    let news = state.news_service.create(body, user.id).await?;
    let tags = state.news_service.tags_for(news.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(NewsResponse::from(news).with_tags(tags)),
    ))
}

/// PUT /api/v1/news/{id} - Update an article
pub async fn update_news(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateNewsInput>,
) -> Result<Json<NewsResponse>, ApiError> {
    let existing = state.news_service.get(id).await?;
    if !user.can_edit(existing.author_id) {
        return Err(ApiError::forbidden("Not allowed to edit this article"));
    }

    let updated = state.news_service.update(id, body).await?;
    let tags = state.news_service.tags_for(id).await?;

    Ok(Json(NewsResponse::from(updated).with_tags(tags)))
}

/// DELETE /api/v1/news/{id} - Delete an article
pub async fn delete_news(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let existing = state.news_service.get(id).await?;
    if !user.can_edit(existing.author_id) {
        return Err(ApiError::forbidden("Not allowed to delete this article"));
    }

    state.news_service.delete(id).await?;
    Ok(Json(MessageResponse::new("Article deleted")))
}
