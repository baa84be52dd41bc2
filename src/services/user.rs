//! User service
//!
//! Business logic for account management:
//! - Registration with duplicate-email/username rejection
//! - Credential authentication with a single collapsed failure outcome
//! - Profile updates, password changes, email verification

use crate::db::repositories::UserRepository;
use crate::models::{CreateUserInput, UpdateUserInput, User};
use crate::services::password::{hash_password, verify_password};
use anyhow::Result;
use std::sync::Arc;

/// Minimum accepted password length
const MIN_PASSWORD_LENGTH: usize = 8;

/// Error types for user service operations
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    /// A unique field is already taken
    #[error("{0}")]
    Conflict(String),

    /// Invalid input
    #[error("{0}")]
    Validation(String),

    /// Credentials did not authenticate.
    ///
    /// Deliberately carries no reason: a missing account, a wrong password
    /// and a deactivated account are indistinguishable to the caller.
    #[error("Incorrect email or password")]
    AuthenticationFailed,

    /// User does not exist
    #[error("User not found")]
    NotFound,

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// User service over the user repository
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    /// Create a new user service
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Register a new account.
    ///
    /// Rejects a duplicate email or username with a conflict before
    /// inserting. The stored credential is the argon2 hash, never the
    /// plaintext. New accounts start active, non-superuser, unverified.
    pub async fn register(&self, input: CreateUserInput) -> Result<User, UserServiceError> {
        if input.username.len() < 3 {
            return Err(UserServiceError::Validation(
                "Username must be at least 3 characters".to_string(),
            ));
        }
        if !input.email.contains('@') {
            return Err(UserServiceError::Validation(
                "Invalid email address".to_string(),
            ));
        }
        if input.password.len() < MIN_PASSWORD_LENGTH {
            return Err(UserServiceError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        if self.repo.find_by_email(&input.email).await?.is_some() {
            return Err(UserServiceError::Conflict(
                "Email is already registered".to_string(),
            ));
        }
        if self.repo.find_by_username(&input.username).await?.is_some() {
            return Err(UserServiceError::Conflict(
                "Username is already taken".to_string(),
            ));
        }

        let password_hash = hash_password(&input.password)?;
        let mut user = User::new(input.email, input.username, password_hash);
        user.full_name = input.full_name;
        user.bio = input.bio;
        user.phone = input.phone;

        let created = self.repo.create(&user).await?;
        tracing::info!(user_id = created.id, "Registered new user");
        Ok(created)
    }

    /// Authenticate an email/password pair.
    ///
    /// Succeeds only when the account exists, the password verifies and the
    /// account is active. All three failures collapse into
    /// [`UserServiceError::AuthenticationFailed`].
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, UserServiceError> {
        let user = self
            .repo
            .find_by_email(email)
            .await?
            .ok_or(UserServiceError::AuthenticationFailed)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(UserServiceError::AuthenticationFailed);
        }

        if !user.is_active {
            return Err(UserServiceError::AuthenticationFailed);
        }

        Ok(user)
    }

    /// Get a user by id
    pub async fn get_by_id(&self, id: i64) -> Result<User, UserServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(UserServiceError::NotFound)
    }

    /// Get a user by id without failing on absence; the optional guard
    /// chain swallows lookups that miss.
    pub async fn try_get_by_id(&self, id: i64) -> Result<Option<User>> {
        self.repo.find_by_id(id).await
    }

    /// Apply profile fields present in the input.
    ///
    /// A changed email or username must still be unique.
    pub async fn update_profile(
        &self,
        id: i64,
        input: UpdateUserInput,
    ) -> Result<User, UserServiceError> {
        let existing = self.get_by_id(id).await?;

        if let Some(email) = &input.email {
            if email != &existing.email && self.repo.find_by_email(email).await?.is_some() {
                return Err(UserServiceError::Conflict(
                    "Email is already registered".to_string(),
                ));
            }
        }
        if let Some(username) = &input.username {
            if username != &existing.username
                && self.repo.find_by_username(username).await?.is_some()
            {
                return Err(UserServiceError::Conflict(
                    "Username is already taken".to_string(),
                ));
            }
        }

        Ok(self.repo.update_profile(id, &input).await?)
    }

    /// Change the password, requiring the current password to verify first.
    pub async fn change_password(
        &self,
        id: i64,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), UserServiceError> {
        let user = self.get_by_id(id).await?;

        if !verify_password(current_password, &user.password_hash)? {
            return Err(UserServiceError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }
        if new_password.len() < MIN_PASSWORD_LENGTH {
            return Err(UserServiceError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        let password_hash = hash_password(new_password)?;
        self.repo.set_password_hash(id, &password_hash).await?;
        tracing::info!(user_id = id, "Password changed");
        Ok(())
    }

    /// Mark the user's email address verified
    pub async fn verify_email(&self, id: i64) -> Result<(), UserServiceError> {
        self.get_by_id(id).await?;
        self.repo.mark_verified(id).await?;
        Ok(())
    }

    /// Stamp the last successful login time
    pub async fn record_login(&self, id: i64) -> Result<(), UserServiceError> {
        self.repo.touch_last_login(id).await?;
        Ok(())
    }
}
