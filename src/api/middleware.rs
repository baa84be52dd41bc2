//! API middleware
//!
//! Contains:
//! - `AppState`, the explicitly constructed application state shared by all
//!   handlers
//! - `ApiError`, the single error shape the boundary layer returns
//! - The auth guard chain: bearer extraction, token verification, user
//!   resolution and status checks, as composable middleware stages

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::models::User;
use crate::services::news::NewsServiceError;
use crate::services::user::UserServiceError;
use crate::services::{NewsService, TokenCodec, UserService};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub user_service: Arc<UserService>,
    pub news_service: Arc<NewsService>,
    pub tokens: Arc<TokenCodec>,
}

/// Authenticated user placed in request extensions by the guard chain
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn user_inactive() -> Self {
        Self::new("USER_INACTIVE", "User account is disabled")
    }

    /// Log the underlying fault and answer with a generic message.
    pub fn internal(err: anyhow::Error) -> Self {
        tracing::error!(error = ?err, "Unhandled internal error");
        Self::new("INTERNAL_ERROR", "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            // Duplicates surface as 400 like any other bad request; the
            // body code still distinguishes them
            "VALIDATION_ERROR" | "CONFLICT" | "USER_INACTIVE" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::UNAUTHORIZED {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], Json(self))
                .into_response();
        }

        (status, Json(self)).into_response()
    }
}

impl From<UserServiceError> for ApiError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::Conflict(msg) => ApiError::conflict(msg),
            UserServiceError::Validation(msg) => ApiError::validation_error(msg),
            UserServiceError::AuthenticationFailed => {
                ApiError::unauthorized("Incorrect email or password")
            }
            UserServiceError::NotFound => ApiError::not_found("User not found"),
            UserServiceError::Internal(e) => ApiError::internal(e),
        }
    }
}

impl From<NewsServiceError> for ApiError {
    fn from(err: NewsServiceError) -> Self {
        match err {
            NewsServiceError::Conflict(msg) => ApiError::conflict(msg),
            NewsServiceError::Validation(msg) => ApiError::validation_error(msg),
            NewsServiceError::NotFound(msg) => ApiError::not_found(msg),
            NewsServiceError::Internal(e) => ApiError::internal(e),
        }
    }
}

/// Extract the bearer credential from the Authorization header
fn extract_bearer_token(request: &Request) -> Option<String> {
    let auth_header = request.headers().get(header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    auth_str.strip_prefix("Bearer ").map(str::to_string)
}

/// Run the guard pipeline: extract credential, verify token, load user,
/// check the account is active.
///
/// Each stage fails with its own outcome; only the inactive-account stage
/// is a 400-class failure, everything before it is unauthenticated.
async fn resolve_user(state: &AppState, token: Option<String>) -> Result<User, ApiError> {
    let token = token.ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let user_id = state
        .tokens
        .verify(&token)
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    let user = state
        .user_service
        .try_get_by_id(user_id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    if !user.is_active {
        return Err(ApiError::user_inactive());
    }

    Ok(user)
}

/// Authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&request);
    let user = resolve_user(&state, token).await?;
    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Optional authentication middleware.
///
/// Runs the same pipeline but swallows every failure and proceeds without a
/// user, for endpoints that personalize output when logged in but do not
/// require login.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = extract_bearer_token(&request);
    if let Ok(user) = resolve_user(&state, token).await {
        request.extensions_mut().insert(AuthenticatedUser(user));
    }
    next.run(request).await
}

/// Superuser authorization middleware; runs after `require_auth`
pub async fn require_superuser(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.is_superuser {
        return Err(ApiError::forbidden("Superuser privileges required"));
    }

    Ok(next.run(request).await)
}

/// Verified-email authorization middleware; runs after `require_auth`
pub async fn require_verified(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    if !user.0.is_verified {
        return Err(ApiError::forbidden("Verified email required"));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_auth(value: &str) -> Request<Body> {
        Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        let request = request_with_auth("Bearer abc.def.ghi");
        assert_eq!(extract_bearer_token(&request), Some("abc.def.ghi".to_string()));
    }

    #[test]
    fn test_extract_bearer_token_missing_header() {
        let request = Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();
        assert!(extract_bearer_token(&request).is_none());
    }

    #[test]
    fn test_extract_bearer_token_wrong_scheme() {
        let request = request_with_auth("Basic dXNlcjpwYXNz");
        assert!(extract_bearer_token(&request).is_none());
    }

    #[test]
    fn test_api_error_status_mapping() {
        let cases = [
            (ApiError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (ApiError::forbidden("x"), StatusCode::FORBIDDEN),
            (ApiError::not_found("x"), StatusCode::NOT_FOUND),
            (ApiError::validation_error("x"), StatusCode::BAD_REQUEST),
            (ApiError::conflict("x"), StatusCode::BAD_REQUEST),
            (ApiError::user_inactive(), StatusCode::BAD_REQUEST),
            (
                ApiError::new("SOMETHING_ELSE", "x"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_unauthorized_carries_www_authenticate() {
        let response = ApiError::unauthorized("x").into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_service_error_conversion() {
        let conflict: ApiError = UserServiceError::Conflict("taken".to_string()).into();
        assert_eq!(conflict.error.code, "CONFLICT");

        let auth: ApiError = UserServiceError::AuthenticationFailed.into();
        assert_eq!(auth.error.code, "UNAUTHORIZED");

        let missing: ApiError = NewsServiceError::NotFound("gone".to_string()).into();
        assert_eq!(missing.error.code, "NOT_FOUND");
    }
}
