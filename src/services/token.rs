//! Signed token issuance and verification
//!
//! Stateless JWT credentials signed with a symmetric key (HS256). Access and
//! refresh tokens are structurally identical except that refresh tokens
//! carry a `token_type: "refresh"` claim and a longer expiry window.
//!
//! Verification is pure: it checks signature and expiry against the embedded
//! timestamp and never touches the data store.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// Marker value for the refresh token type claim
const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Claim set carried by both token kinds.
///
/// `sub` is the user id as a string; `token_type` is present only on
/// refresh tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// Encodes and verifies the platform's bearer tokens.
///
/// Constructed once from [`AuthConfig`] and shared through application
/// state; holds the signing secret and both expiry windows.
#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenCodec {
    /// Build a codec from the auth configuration
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.secret_key.clone(),
            access_ttl: Duration::minutes(config.access_token_expire_minutes),
            refresh_ttl: Duration::days(config.refresh_token_expire_days),
        }
    }

    /// Access-token lifetime in whole seconds, for the login response
    pub fn access_expires_in(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    /// Issue a short-lived access token for the given user
    pub fn issue_access(&self, user_id: i64) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue(user_id, self.access_ttl, None)
    }

    /// Issue a long-lived refresh token for the given user
    pub fn issue_refresh(&self, user_id: i64) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue(user_id, self.refresh_ttl, Some(REFRESH_TOKEN_TYPE.to_string()))
    }

    fn issue(
        &self,
        user_id: i64,
        ttl: Duration,
        token_type: Option<String>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (Utc::now() + ttl).timestamp(),
            token_type,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Verify a token and return the subject user id.
    ///
    /// Returns `None` on any failure: bad encoding, wrong signature, expired
    /// token, or a subject that is not an integer. The same routine accepts
    /// access and refresh tokens.
    pub fn verify(&self, token: &str) -> Option<i64> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .ok()?;

        data.claims.sub.parse().ok()
    }

    /// Decode without verifying liveness; used only by tests to inspect claims
    #[cfg(test)]
    fn decode_claims(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.validate_exp = false;
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .ok()
        .map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(&AuthConfig {
            secret_key: "test-secret-key".to_string(),
            access_token_expire_minutes: 30,
            refresh_token_expire_days: 7,
        })
    }

    #[test]
    fn test_verify_returns_subject() {
        let codec = codec();
        let token = codec.issue_access(42).expect("issue failed");
        assert_eq!(codec.verify(&token), Some(42));
    }

    #[test]
    fn test_refresh_token_verifies_with_same_routine() {
        let codec = codec();
        let token = codec.issue_refresh(42).expect("issue failed");
        assert_eq!(codec.verify(&token), Some(42));
    }

    #[test]
    fn test_refresh_token_carries_type_claim() {
        let codec = codec();

        let access = codec.issue_access(1).unwrap();
        let refresh = codec.issue_refresh(1).unwrap();

        let access_claims = codec.decode_claims(&access).unwrap();
        let refresh_claims = codec.decode_claims(&refresh).unwrap();

        assert!(access_claims.token_type.is_none());
        assert_eq!(refresh_claims.token_type.as_deref(), Some("refresh"));
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let codec = codec();
        let expired = codec.issue(7, Duration::seconds(-5), None).unwrap();
        assert_eq!(codec.verify(&expired), None);
    }

    #[test]
    fn test_garbage_and_wrong_key_are_invalid() {
        let codec = codec();
        assert_eq!(codec.verify("not-a-token"), None);
        assert_eq!(codec.verify(""), None);

        let other = TokenCodec::new(&AuthConfig {
            secret_key: "a-different-secret".to_string(),
            access_token_expire_minutes: 30,
            refresh_token_expire_days: 7,
        });
        let token = other.issue_access(1).unwrap();
        assert_eq!(codec.verify(&token), None);
    }

    #[test]
    fn test_tampered_token_is_invalid() {
        let codec = codec();
        let token = codec.issue_access(1).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        assert_eq!(codec.verify(&tampered), None);
    }

    proptest! {
        #[test]
        fn prop_issue_verify_roundtrip(user_id in 1i64..i64::MAX / 2) {
            let codec = codec();
            let access = codec.issue_access(user_id).unwrap();
            let refresh = codec.issue_refresh(user_id).unwrap();
            prop_assert_eq!(codec.verify(&access), Some(user_id));
            prop_assert_eq!(codec.verify(&refresh), Some(user_id));
        }
    }
}
