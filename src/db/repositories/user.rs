//! User repository
//!
//! Database operations for user accounts.

use crate::models::{UpdateUserInput, User};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return it with its assigned id
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Get user by username
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Apply the profile fields present in the input
    async fn update_profile(&self, id: i64, input: &UpdateUserInput) -> Result<User>;

    /// Replace the stored password hash
    async fn set_password_hash(&self, id: i64, password_hash: &str) -> Result<()>;

    /// Mark the email address verified and stamp the verification time
    async fn mark_verified(&self, id: i64) -> Result<()>;

    /// Stamp the last successful login time
    async fn touch_last_login(&self, id: i64) -> Result<()>;
}

/// sqlx-backed user repository
pub struct SqlxUserRepository {
    pool: SqlitePool,
}

impl SqlxUserRepository {
    /// Create a new repository over the given pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for dependency injection
    pub fn boxed(pool: SqlitePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

const USER_COLUMNS: &str = "id, email, username, full_name, password_hash, is_active, is_superuser, is_verified, avatar_url, bio, phone, last_login, email_verified_at, created_at, updated_at";

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, username, full_name, password_hash, is_active, is_superuser, is_verified, avatar_url, bio, phone, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.is_superuser)
        .bind(user.is_verified)
        .bind(&user.avatar_url)
        .bind(&user.bio)
        .bind(&user.phone)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("Failed to create user")?;

        let id = result.last_insert_rowid();

        Ok(User {
            id,
            created_at: now,
            updated_at: now,
            ..user.clone()
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get user by ID")?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to get user by email")?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by username")?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn update_profile(&self, id: i64, input: &UpdateUserInput) -> Result<User> {
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found"))?;

        let now = Utc::now();
        let email = input.email.as_ref().unwrap_or(&existing.email);
        let username = input.username.as_ref().unwrap_or(&existing.username);
        let full_name = input.full_name.clone().or(existing.full_name.clone());
        let bio = input.bio.clone().or(existing.bio.clone());
        let phone = input.phone.clone().or(existing.phone.clone());
        let avatar_url = input.avatar_url.clone().or(existing.avatar_url.clone());

        sqlx::query(
            r#"
            UPDATE users
            SET email = ?, username = ?, full_name = ?, bio = ?, phone = ?, avatar_url = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(email)
        .bind(username)
        .bind(&full_name)
        .bind(&bio)
        .bind(&phone)
        .bind(&avatar_url)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update user profile")?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("User not found after update"))
    }

    async fn set_password_hash(&self, id: i64, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update password hash")?;
        Ok(())
    }

    async fn mark_verified(&self, id: i64) -> Result<()> {
        let now = Utc::now();
        sqlx::query(
            "UPDATE users SET is_verified = 1, email_verified_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to mark user verified")?;
        Ok(())
    }

    async fn touch_last_login(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to record login time")?;
        Ok(())
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        username: row.get("username"),
        full_name: row.get("full_name"),
        password_hash: row.get("password_hash"),
        is_active: row.get("is_active"),
        is_superuser: row.get("is_superuser"),
        is_verified: row.get("is_verified"),
        avatar_url: row.get("avatar_url"),
        bio: row.get("bio"),
        phone: row.get("phone"),
        last_login: row.get("last_login"),
        email_verified_at: row.get("email_verified_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxUserRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxUserRepository::new(pool)
    }

    fn test_user(email: &str, username: &str) -> User {
        User::new(email.to_string(), username.to_string(), "$argon2id$h".to_string())
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = setup_test_repo().await;

        let created = repo
            .create(&test_user("a@example.com", "alice"))
            .await
            .expect("Failed to create user");
        assert!(created.id > 0);

        let by_id = repo
            .find_by_id(created.id)
            .await
            .expect("Failed to find user")
            .expect("User not found");
        assert_eq!(by_id.email, "a@example.com");

        let by_email = repo
            .find_by_email("a@example.com")
            .await
            .expect("Failed to find user")
            .expect("User not found");
        assert_eq!(by_email.id, created.id);

        let by_username = repo
            .find_by_username("alice")
            .await
            .expect("Failed to find user")
            .expect("User not found");
        assert_eq!(by_username.id, created.id);
    }

    #[tokio::test]
    async fn test_find_missing_user_returns_none() {
        let repo = setup_test_repo().await;
        assert!(repo.find_by_id(999).await.unwrap().is_none());
        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_profile_partial() {
        let repo = setup_test_repo().await;
        let created = repo.create(&test_user("a@example.com", "alice")).await.unwrap();

        let input = UpdateUserInput {
            bio: Some("hello".to_string()),
            ..Default::default()
        };
        let updated = repo
            .update_profile(created.id, &input)
            .await
            .expect("Failed to update profile");

        assert_eq!(updated.bio.as_deref(), Some("hello"));
        assert_eq!(updated.email, "a@example.com");
        assert_eq!(updated.username, "alice");
    }

    #[tokio::test]
    async fn test_set_password_hash() {
        let repo = setup_test_repo().await;
        let created = repo.create(&test_user("a@example.com", "alice")).await.unwrap();

        repo.set_password_hash(created.id, "$argon2id$new")
            .await
            .expect("Failed to set hash");

        let user = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(user.password_hash, "$argon2id$new");
    }

    #[tokio::test]
    async fn test_mark_verified() {
        let repo = setup_test_repo().await;
        let created = repo.create(&test_user("a@example.com", "alice")).await.unwrap();
        assert!(!created.is_verified);

        repo.mark_verified(created.id).await.expect("Failed to verify");

        let user = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert!(user.is_verified);
        assert!(user.email_verified_at.is_some());
    }

    #[tokio::test]
    async fn test_touch_last_login() {
        let repo = setup_test_repo().await;
        let created = repo.create(&test_user("a@example.com", "alice")).await.unwrap();
        assert!(created.last_login.is_none());

        repo.touch_last_login(created.id).await.expect("Failed to touch");

        let user = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert!(user.last_login.is_some());
    }
}
