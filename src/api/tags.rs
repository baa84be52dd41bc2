//! Tag API endpoints
//!
//! Handles HTTP requests for tags:
//! - GET  /api/v1/news/tags/ - List all tags
//! - POST /api/v1/news/tags/ - Create a tag (superuser)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::TagResponse;
use crate::models::CreateTagInput;

/// GET /api/v1/news/tags/ - List all tags
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let tags = state.news_service.list_tags().await?;
    Ok(Json(tags.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/news/tags/ - Create a tag.
///
/// Reached only through the superuser guard chain.
pub async fn create_tag(
    State(state): State<AppState>,
    Json(body): Json<CreateTagInput>,
) -> Result<impl IntoResponse, ApiError> {
    let tag = state.news_service.create_tag(body).await?;
    Ok((StatusCode::CREATED, Json(TagResponse::from(tag))))
}
