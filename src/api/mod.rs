//! API layer - HTTP handlers and routing
//!
//! All HTTP endpoints for the Newswire backend:
//! - Auth endpoints (register, login, refresh, change-password, me)
//! - News endpoints (search/list, detail, create, update, delete)
//! - Category and tag endpoints
//! - Health and root endpoints
//!
//! Routes are grouped by the guard chain they pass through: public,
//! optional-auth, authenticated, and superuser.

pub mod auth;
pub mod categories;
pub mod middleware;
pub mod news;
pub mod responses;
pub mod tags;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState, AuthenticatedUser};

/// Build the versioned API router
pub fn build_api_router(state: AppState) -> Router<AppState> {
    // Superuser routes (category/tag creation)
    let superuser_routes = Router::new()
        .route("/news/categories/", post(categories::create_category))
        .route("/news/tags/", post(tags::create_tag))
        .route_layer(axum_middleware::from_fn(middleware::require_superuser))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Authenticated routes
    let protected_routes = Router::new()
        .route("/auth/change-password", post(auth::change_password))
        .route("/auth/me", get(auth::me))
        .route("/news/", post(news::create_news))
        .route(
            "/news/{id}",
            put(news::update_news).delete(news::delete_news),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Optional-auth routes: a presented token resolves a user, a missing or
    // bad one does not reject
    let optional_routes = Router::new()
        .route("/news/{id}", get(news::get_news))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::optional_auth,
        ));

    // Public routes
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/news/", get(news::list_news))
        .route("/news/categories/", get(categories::list_categories))
        .route("/news/tags/", get(tags::list_tags))
        .merge(optional_routes)
        .merge(protected_routes)
        .merge(superuser_routes)
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            cors_origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:5173")),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root banner response
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub version: String,
}

/// GET / - Service banner
async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Newswire API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

/// GET /health - Reports database reachability
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_ok = crate::db::ping(&state.pool).await.is_ok();

    Json(HealthResponse {
        status: if db_ok { "healthy" } else { "unhealthy" }.to_string(),
        database: if db_ok { "connected" } else { "disconnected" }.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::responses::{NewsListResponse, NewsResponse, TokenResponse, UserResponse};
    use crate::config::AuthConfig;
    use crate::db::repositories::{
        SqlxCategoryRepository, SqlxNewsRepository, SqlxTagRepository, SqlxUserRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use crate::services::{NewsService, TokenCodec, UserService};
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use serde_json::json;
    use sqlx::SqlitePool;
    use std::sync::Arc;

    async fn test_state() -> (AppState, SqlitePool) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let state = AppState {
            pool: pool.clone(),
            user_service: Arc::new(UserService::new(SqlxUserRepository::boxed(pool.clone()))),
            news_service: Arc::new(NewsService::new(
                SqlxNewsRepository::boxed(pool.clone()),
                SqlxCategoryRepository::boxed(pool.clone()),
                SqlxTagRepository::boxed(pool.clone()),
            )),
            tokens: Arc::new(TokenCodec::new(&AuthConfig {
                secret_key: "test-secret".to_string(),
                access_token_expire_minutes: 30,
                refresh_token_expire_days: 7,
            })),
        };
        (state, pool)
    }

    async fn test_server() -> (TestServer, SqlitePool) {
        let (state, pool) = test_state().await;
        let server = TestServer::new(build_router(state, "http://localhost:5173"))
            .expect("Failed to build test server");
        (server, pool)
    }

    fn bearer(token: &str) -> (HeaderName, HeaderValue) {
        (
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        )
    }

    async fn register(server: &TestServer, email: &str, username: &str) -> UserResponse {
        let response = server
            .post("/api/v1/auth/register")
            .json(&json!({
                "email": email,
                "username": username,
                "password": "pw12345678",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<UserResponse>()
    }

    async fn login(server: &TestServer, email: &str) -> TokenResponse {
        let response = server
            .post("/api/v1/auth/login")
            .form(&json!({ "username": email, "password": "pw12345678" }))
            .await;
        response.assert_status_ok();
        response.json::<TokenResponse>()
    }

    async fn seed_category(pool: &SqlitePool, slug: &str) -> i64 {
        sqlx::query("INSERT INTO categories (name, slug) VALUES (?, ?)")
            .bind(format!("Category {}", slug))
            .bind(slug)
            .execute(pool)
            .await
            .expect("Failed to seed category")
            .last_insert_rowid()
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let (server, _pool) = test_server().await;

        let root = server.get("/").await;
        root.assert_status_ok();
        assert_eq!(root.json::<RootResponse>().message, "Newswire API");

        let health = server.get("/health").await;
        health.assert_status_ok();
        let body = health.json::<HealthResponse>();
        assert_eq!(body.status, "healthy");
        assert_eq!(body.database, "connected");
    }

    #[tokio::test]
    async fn test_register_then_login_returns_token_pair() {
        let (server, _pool) = test_server().await;

        let user = register(&server, "a@x.com", "alice").await;
        assert_eq!(user.email, "a@x.com");
        assert!(user.is_active);

        let tokens = login(&server, "a@x.com").await;
        assert!(!tokens.access_token.is_empty());
        assert!(!tokens.refresh_token.is_empty());
        assert_ne!(tokens.access_token, tokens.refresh_token);
        assert_eq!(tokens.token_type, "bearer");
        assert_eq!(tokens.expires_in, 30 * 60);
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_is_401() {
        let (server, _pool) = test_server().await;
        register(&server, "a@x.com", "alice").await;

        let response = server
            .post("/api/v1/auth/login")
            .form(&json!({ "username": "a@x.com", "password": "wrong-password" }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_is_400_conflict() {
        let (server, _pool) = test_server().await;
        register(&server, "a@x.com", "alice").await;

        let response = server
            .post("/api/v1/auth/register")
            .json(&json!({
                "email": "a@x.com",
                "username": "someone-else",
                "password": "pw12345678",
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error = response.json::<ApiError>();
        assert_eq!(error.error.code, "CONFLICT");
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let (server, _pool) = test_server().await;
        register(&server, "a@x.com", "alice").await;

        let unauthenticated = server.get("/api/v1/auth/me").await;
        unauthenticated.assert_status(StatusCode::UNAUTHORIZED);

        let garbage = server
            .get("/api/v1/auth/me")
            .add_header(bearer("garbage").0, bearer("garbage").1)
            .await;
        garbage.assert_status(StatusCode::UNAUTHORIZED);

        let tokens = login(&server, "a@x.com").await;
        let (name, value) = bearer(&tokens.access_token);
        let me = server.get("/api/v1/auth/me").add_header(name, value).await;
        me.assert_status_ok();
        assert_eq!(me.json::<UserResponse>().username, "alice");
    }

    #[tokio::test]
    async fn test_refresh_flow() {
        let (server, _pool) = test_server().await;
        register(&server, "a@x.com", "alice").await;
        let tokens = login(&server, "a@x.com").await;

        let refreshed = server
            .post("/api/v1/auth/refresh")
            .json(&json!({ "refresh_token": tokens.refresh_token }))
            .await;
        refreshed.assert_status_ok();
        let new_pair = refreshed.json::<TokenResponse>();
        assert!(!new_pair.access_token.is_empty());

        let bad = server
            .post("/api/v1/auth/refresh")
            .json(&json!({ "refresh_token": "not-a-token" }))
            .await;
        bad.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_change_password_flow() {
        let (server, _pool) = test_server().await;
        register(&server, "a@x.com", "alice").await;
        let tokens = login(&server, "a@x.com").await;
        let (name, value) = bearer(&tokens.access_token);

        let wrong = server
            .post("/api/v1/auth/change-password")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "current_password": "not-right",
                "new_password": "brand-new-pw1",
            }))
            .await;
        wrong.assert_status(StatusCode::BAD_REQUEST);

        let changed = server
            .post("/api/v1/auth/change-password")
            .add_header(name, value)
            .json(&json!({
                "current_password": "pw12345678",
                "new_password": "brand-new-pw1",
            }))
            .await;
        changed.assert_status_ok();

        // Old password no longer authenticates
        let old_login = server
            .post("/api/v1/auth/login")
            .form(&json!({ "username": "a@x.com", "password": "pw12345678" }))
            .await;
        old_login.assert_status(StatusCode::UNAUTHORIZED);

        let new_login = server
            .post("/api/v1/auth/login")
            .form(&json!({ "username": "a@x.com", "password": "brand-new-pw1" }))
            .await;
        new_login.assert_status_ok();
    }

    #[tokio::test]
    async fn test_inactive_user_with_valid_token_is_400() {
        let (server, pool) = test_server().await;
        let user = register(&server, "a@x.com", "alice").await;
        let tokens = login(&server, "a@x.com").await;

        sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
            .bind(user.id)
            .execute(&pool)
            .await
            .unwrap();

        let (name, value) = bearer(&tokens.access_token);
        let response = server.get("/api/v1/auth/me").add_header(name, value).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<ApiError>().error.code, "USER_INACTIVE");
    }

    #[tokio::test]
    async fn test_create_news_requires_auth_and_returns_201() {
        let (server, pool) = test_server().await;
        register(&server, "a@x.com", "alice").await;
        let tokens = login(&server, "a@x.com").await;
        let category_id = seed_category(&pool, "world").await;

        let body = json!({
            "title": "A Story",
            "slug": "a-story",
            "content": "Body text",
            "is_published": true,
            "category_id": category_id,
        });

        let anonymous = server.post("/api/v1/news/").json(&body).await;
        anonymous.assert_status(StatusCode::UNAUTHORIZED);

        let (name, value) = bearer(&tokens.access_token);
        let created = server
            .post("/api/v1/news/")
            .add_header(name, value)
            .json(&body)
            .await;
        created.assert_status(StatusCode::CREATED);
        let news = created.json::<NewsResponse>();
        assert_eq!(news.slug, "a-story");
        assert_eq!(news.view_count, 0);
    }

    #[tokio::test]
    async fn test_get_news_increments_view_count_per_call() {
        let (server, pool) = test_server().await;
        register(&server, "a@x.com", "alice").await;
        let tokens = login(&server, "a@x.com").await;
        let category_id = seed_category(&pool, "world").await;

        let (name, value) = bearer(&tokens.access_token);
        let created = server
            .post("/api/v1/news/")
            .add_header(name, value)
            .json(&json!({
                "title": "A Story",
                "slug": "a-story",
                "content": "Body text",
                "is_published": true,
                "category_id": category_id,
            }))
            .await;
        let id = created.json::<NewsResponse>().id;

        // Anonymous reads count too
        let first = server.get(&format!("/api/v1/news/{}", id)).await;
        first.assert_status_ok();
        assert_eq!(first.json::<NewsResponse>().view_count, 1);

        let second = server.get(&format!("/api/v1/news/{}", id)).await;
        assert_eq!(second.json::<NewsResponse>().view_count, 2);

        let missing = server.get("/api/v1/news/99999").await;
        missing.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_author_update_is_403_superuser_allowed() {
        let (server, pool) = test_server().await;
        register(&server, "a@x.com", "alice").await;
        register(&server, "b@x.com", "bob").await;
        let admin = register(&server, "c@x.com", "carol").await;
        sqlx::query("UPDATE users SET is_superuser = 1 WHERE id = ?")
            .bind(admin.id)
            .execute(&pool)
            .await
            .unwrap();

        let category_id = seed_category(&pool, "world").await;

        let alice_tokens = login(&server, "a@x.com").await;
        let (name, value) = bearer(&alice_tokens.access_token);
        let created = server
            .post("/api/v1/news/")
            .add_header(name, value)
            .json(&json!({
                "title": "Alice's Story",
                "slug": "alice-story",
                "content": "Body",
                "is_published": true,
                "category_id": category_id,
            }))
            .await;
        let id = created.json::<NewsResponse>().id;

        let bob_tokens = login(&server, "b@x.com").await;
        let (name, value) = bearer(&bob_tokens.access_token);
        let forbidden = server
            .put(&format!("/api/v1/news/{}", id))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "title": "Bob's Edit" }))
            .await;
        forbidden.assert_status(StatusCode::FORBIDDEN);

        let delete_forbidden = server
            .delete(&format!("/api/v1/news/{}", id))
            .add_header(name, value)
            .await;
        delete_forbidden.assert_status(StatusCode::FORBIDDEN);

        let carol_tokens = login(&server, "c@x.com").await;
        let (name, value) = bearer(&carol_tokens.access_token);
        let allowed = server
            .put(&format!("/api/v1/news/{}", id))
            .add_header(name, value)
            .json(&json!({ "title": "Edited By Superuser" }))
            .await;
        allowed.assert_status_ok();
        assert_eq!(allowed.json::<NewsResponse>().title, "Edited By Superuser");
    }

    #[tokio::test]
    async fn test_partial_update_keeps_unmentioned_fields() {
        let (server, pool) = test_server().await;
        register(&server, "a@x.com", "alice").await;
        let tokens = login(&server, "a@x.com").await;
        let category_id = seed_category(&pool, "world").await;

        let (name, value) = bearer(&tokens.access_token);
        let created = server
            .post("/api/v1/news/")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "title": "Original",
                "slug": "original",
                "summary": "A summary",
                "content": "Original content",
                "is_published": true,
                "category_id": category_id,
            }))
            .await;
        let id = created.json::<NewsResponse>().id;

        let updated = server
            .put(&format!("/api/v1/news/{}", id))
            .add_header(name, value)
            .json(&json!({ "title": "Renamed" }))
            .await;
        updated.assert_status_ok();
        let news = updated.json::<NewsResponse>();
        assert_eq!(news.title, "Renamed");
        assert_eq!(news.content, "Original content");
        assert_eq!(news.summary.as_deref(), Some("A summary"));
        assert_eq!(news.category_id, category_id);
    }

    #[tokio::test]
    async fn test_news_listing_search_and_pagination() {
        let (server, pool) = test_server().await;
        register(&server, "a@x.com", "alice").await;
        let tokens = login(&server, "a@x.com").await;
        let category_id = seed_category(&pool, "world").await;
        let (name, value) = bearer(&tokens.access_token);

        for i in 1..=25 {
            server
                .post("/api/v1/news/")
                .add_header(name.clone(), value.clone())
                .json(&json!({
                    "title": format!("Story {}", i),
                    "slug": format!("story-{}", i),
                    "content": "Body",
                    "is_published": true,
                    "category_id": category_id,
                }))
                .await
                .assert_status(StatusCode::CREATED);
        }
        // One unpublished draft that must never surface
        server
            .post("/api/v1/news/")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "title": "Secret Draft",
                "slug": "secret-draft",
                "content": "Body",
                "is_published": false,
                "category_id": category_id,
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let page3 = server.get("/api/v1/news/?page=3&size=10").await;
        page3.assert_status_ok();
        let listing = page3.json::<NewsListResponse>();
        assert_eq!(listing.items.len(), 5);
        assert_eq!(listing.total, 25);
        assert_eq!(listing.pages, 3);

        let searched = server.get("/api/v1/news/?q=secret").await;
        assert_eq!(searched.json::<NewsListResponse>().total, 0);

        let bad_tags = server.get("/api/v1/news/?tag_ids=1,nope").await;
        bad_tags.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_category_creation_requires_superuser() {
        let (server, pool) = test_server().await;
        register(&server, "a@x.com", "alice").await;
        let admin = register(&server, "c@x.com", "carol").await;
        sqlx::query("UPDATE users SET is_superuser = 1 WHERE id = ?")
            .bind(admin.id)
            .execute(&pool)
            .await
            .unwrap();

        let body = json!({ "name": "World", "slug": "world" });

        let alice_tokens = login(&server, "a@x.com").await;
        let (name, value) = bearer(&alice_tokens.access_token);
        let forbidden = server
            .post("/api/v1/news/categories/")
            .add_header(name, value)
            .json(&body)
            .await;
        forbidden.assert_status(StatusCode::FORBIDDEN);

        let carol_tokens = login(&server, "c@x.com").await;
        let (name, value) = bearer(&carol_tokens.access_token);
        let created = server
            .post("/api/v1/news/categories/")
            .add_header(name.clone(), value.clone())
            .json(&body)
            .await;
        created.assert_status(StatusCode::CREATED);

        // Duplicate name is a conflict
        let duplicate = server
            .post("/api/v1/news/categories/")
            .add_header(name, value)
            .json(&body)
            .await;
        duplicate.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(duplicate.json::<ApiError>().error.code, "CONFLICT");

        let listed = server.get("/api/v1/news/categories/").await;
        listed.assert_status_ok();
    }

    #[tokio::test]
    async fn test_verified_guard_opens_after_email_verification() {
        let (state, _pool) = test_state().await;

        let app = Router::new()
            .route("/verified-only", get(|| async { "ok" }))
            .route_layer(axum_middleware::from_fn(middleware::require_verified))
            .route_layer(axum_middleware::from_fn_with_state(
                state.clone(),
                middleware::require_auth,
            ))
            .with_state(state.clone());
        let server = TestServer::new(app).expect("Failed to build test server");

        let user = state
            .user_service
            .register(crate::models::CreateUserInput {
                email: "a@x.com".to_string(),
                username: "alice".to_string(),
                password: "pw12345678".to_string(),
                full_name: None,
                bio: None,
                phone: None,
            })
            .await
            .unwrap();
        let token = state.tokens.issue_access(user.id).unwrap();
        let (name, value) = bearer(&token);

        // Fresh accounts are unverified
        let forbidden = server
            .get("/verified-only")
            .add_header(name.clone(), value.clone())
            .await;
        forbidden.assert_status(StatusCode::FORBIDDEN);

        state.user_service.verify_email(user.id).await.unwrap();

        let allowed = server.get("/verified-only").add_header(name, value).await;
        allowed.assert_status_ok();
    }

    #[tokio::test]
    async fn test_tag_creation_and_filtered_search() {
        let (server, pool) = test_server().await;
        let admin = register(&server, "c@x.com", "carol").await;
        sqlx::query("UPDATE users SET is_superuser = 1 WHERE id = ?")
            .bind(admin.id)
            .execute(&pool)
            .await
            .unwrap();
        let category_id = seed_category(&pool, "world").await;

        let tokens = login(&server, "c@x.com").await;
        let (name, value) = bearer(&tokens.access_token);

        let tag = server
            .post("/api/v1/news/tags/")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "name": "Economy", "slug": "economy" }))
            .await;
        tag.assert_status(StatusCode::CREATED);
        let tag_id = tag.json::<crate::api::responses::TagResponse>().id;

        server
            .post("/api/v1/news/")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "title": "Tagged",
                "slug": "tagged",
                "content": "Body",
                "is_published": true,
                "category_id": category_id,
                "tag_ids": [tag_id],
            }))
            .await
            .assert_status(StatusCode::CREATED);
        server
            .post("/api/v1/news/")
            .add_header(name, value)
            .json(&json!({
                "title": "Untagged",
                "slug": "untagged",
                "content": "Body",
                "is_published": true,
                "category_id": category_id,
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let filtered = server
            .get(&format!("/api/v1/news/?tag_ids={}", tag_id))
            .await;
        let listing = filtered.json::<NewsListResponse>();
        assert_eq!(listing.total, 1);
        assert_eq!(listing.items[0].slug, "tagged");
    }
}
