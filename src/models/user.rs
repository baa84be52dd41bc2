//! User model
//!
//! This module defines the User entity and related input types for the
//! Newswire platform. The password is stored only as an argon2 hash;
//! `password_hash` is never serialized into API responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity representing a registered account.
///
/// Status flags drive the auth guard chain: an account must be active to
/// authenticate or keep an existing session valid, superusers may manage
/// other authors' content, and verification gates a small set of endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Email address (unique)
    pub email: String,
    /// Username (unique)
    pub username: String,
    /// Display name
    pub full_name: Option<String>,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the account may authenticate
    pub is_active: bool,
    /// Whether the account has administrative rights
    pub is_superuser: bool,
    /// Whether the email address has been verified
    pub is_verified: bool,
    /// Avatar image URL
    pub avatar_url: Option<String>,
    /// Short biography
    pub bio: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Last successful login timestamp
    pub last_login: Option<DateTime<Utc>>,
    /// When the email address was verified
    pub email_verified_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given identity and credential.
    ///
    /// The password must already be hashed; use
    /// `services::password::hash_password()`. New accounts start active,
    /// non-superuser and unverified.
    pub fn new(email: String, username: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            email,
            username,
            full_name: None,
            password_hash,
            is_active: true,
            is_superuser: false,
            is_verified: false,
            avatar_url: None,
            bio: None,
            phone: None,
            last_login: None,
            email_verified_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the user may edit content owned by the given author.
    ///
    /// Superusers can edit anyone's content; everyone else only their own.
    pub fn can_edit(&self, author_id: i64) -> bool {
        self.is_superuser || self.id == author_id
    }
}

/// Input for creating a new user (before password hashing)
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserInput {
    /// Email address
    pub email: String,
    /// Username
    pub username: String,
    /// Plaintext password (will be hashed)
    pub password: String,
    /// Display name (optional)
    pub full_name: Option<String>,
    /// Short biography (optional)
    pub bio: Option<String>,
    /// Phone number (optional)
    pub phone: Option<String>,
}

/// Input for updating a user's profile
///
/// Only fields that are `Some` are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateUserInput {
    /// New email (optional)
    pub email: Option<String>,
    /// New username (optional)
    pub username: Option<String>,
    /// New display name (optional)
    pub full_name: Option<String>,
    /// New biography (optional)
    pub bio: Option<String>,
    /// New phone number (optional)
    pub phone: Option<String>,
    /// New avatar URL (optional)
    pub avatar_url: Option<String>,
}

impl UpdateUserInput {
    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.email.is_some()
            || self.username.is_some()
            || self.full_name.is_some()
            || self.bio.is_some()
            || self.phone.is_some()
            || self.avatar_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new_defaults() {
        let user = User::new(
            "a@example.com".to_string(),
            "alice".to_string(),
            "$argon2id$hash".to_string(),
        );

        assert_eq!(user.id, 0);
        assert!(user.is_active);
        assert!(!user.is_superuser);
        assert!(!user.is_verified);
        assert!(user.last_login.is_none());
    }

    #[test]
    fn test_user_can_edit() {
        let mut author = User::new("a@x.com".to_string(), "a".to_string(), "h".to_string());
        author.id = 1;

        let mut other = User::new("b@x.com".to_string(), "b".to_string(), "h".to_string());
        other.id = 2;

        let mut admin = User::new("c@x.com".to_string(), "c".to_string(), "h".to_string());
        admin.id = 3;
        admin.is_superuser = true;

        assert!(author.can_edit(1));
        assert!(!other.can_edit(1));
        assert!(admin.can_edit(1));
        assert!(admin.can_edit(2));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("a@x.com".to_string(), "a".to_string(), "secret-hash".to_string());
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_update_input_has_changes() {
        let empty = UpdateUserInput::default();
        assert!(!empty.has_changes());

        let update = UpdateUserInput {
            bio: Some("hello".to_string()),
            ..Default::default()
        };
        assert!(update.has_changes());
    }
}
