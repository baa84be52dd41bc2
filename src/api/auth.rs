//! Authentication API endpoints
//!
//! Handles HTTP requests for account management:
//! - POST /api/v1/auth/register - User registration
//! - POST /api/v1/auth/login - Login with form-encoded credentials
//! - POST /api/v1/auth/refresh - Mint a new token pair from a refresh token
//! - POST /api/v1/auth/change-password - Change the current user's password
//! - GET  /api/v1/auth/me - Current user info

use axum::{extract::State, http::StatusCode, response::IntoResponse, Form, Json};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{MessageResponse, TokenResponse, UserResponse};
use crate::models::CreateUserInput;

/// Form body for login.
///
/// The `username` field carries the email address, matching the usual
/// password-grant form shape.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Request body for token refresh
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for changing the password
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// POST /api/v1/auth/register - Register a new account
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<CreateUserInput>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.user_service.register(body).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /api/v1/auth/login - Authenticate and issue a token pair
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .user_service
        .authenticate(&form.username, &form.password)
        .await?;

    state.user_service.record_login(user.id).await?;

    issue_pair(&state, user.id).map(Json)
}

/// POST /api/v1/auth/refresh - Mint a new token pair.
///
/// The presented token must verify and its subject must still be an active
/// account; both failures are unauthenticated.
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user_id = state
        .tokens
        .verify(&body.refresh_token)
        .ok_or_else(|| ApiError::unauthorized("Invalid refresh token"))?;

    let user = state
        .user_service
        .try_get_by_id(user_id)
        .await
        .map_err(ApiError::internal)?
        .filter(|user| user.is_active)
        .ok_or_else(|| ApiError::unauthorized("User not found or disabled"))?;

    issue_pair(&state, user.id).map(Json)
}

/// POST /api/v1/auth/change-password - Change the current user's password
pub async fn change_password(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .user_service
        .change_password(user.id, &body.current_password, &body.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password changed")))
}

/// GET /api/v1/auth/me - Current user info
pub async fn me(AuthenticatedUser(user): AuthenticatedUser) -> Json<UserResponse> {
    Json(user.into())
}

fn issue_pair(state: &AppState, user_id: i64) -> Result<TokenResponse, ApiError> {
    let access_token = state
        .tokens
        .issue_access(user_id)
        .map_err(|e| ApiError::internal(e.into()))?;
    let refresh_token = state
        .tokens
        .issue_refresh(user_id)
        .map_err(|e| ApiError::internal(e.into()))?;

    Ok(TokenResponse {
        access_token,
        refresh_token,
        token_type: "bearer".to_string(),
        expires_in: state.tokens.access_expires_in(),
    })
}
