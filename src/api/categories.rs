//! Category API endpoints
//!
//! Handles HTTP requests for categories:
//! - GET  /api/v1/news/categories/ - List active categories
//! - POST /api/v1/news/categories/ - Create a category (superuser)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::CategoryResponse;
use crate::models::CreateCategoryInput;

/// GET /api/v1/news/categories/ - List active categories
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = state.news_service.list_categories().await?;
    Ok(Json(categories.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/news/categories/ - Create a category.
///
/// Reached only through the superuser guard chain.
pub async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.news_service.create_category(body).await?;
    Ok((StatusCode::CREATED, Json(CategoryResponse::from(category))))
}
