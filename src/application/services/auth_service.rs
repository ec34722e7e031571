//! Authentication service for API token validation.

use hmac::{Hmac, Mac};
use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::Sha256;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::entities::ApiToken;
use crate::domain::errors::StoreError;
use crate::domain::repositories::TokenRepository;

type HmacSha256 = Hmac<Sha256>;

/// Length of generated raw tokens.
pub const TOKEN_LENGTH: usize = 48;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid or revoked token")]
    InvalidToken,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Hashes a raw token with HMAC-SHA256 keyed by `secret`.
///
/// Returns a 64-character lowercase hex-encoded MAC.
pub fn hash_token(secret: &str, token: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(token.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Generates a random alphanumeric raw token.
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Service for authenticating API requests via Bearer tokens.
///
/// Tokens are hashed with HMAC-SHA256 (keyed by `signing_secret`) before storage
/// and comparison. An attacker with read-only access to the database cannot verify
/// or forge tokens without the server-side secret.
pub struct AuthService<R: TokenRepository + ?Sized> {
    repository: Arc<R>,
    signing_secret: String,
}

impl<R: TokenRepository + ?Sized> AuthService<R> {
    /// Creates a new authentication service.
    ///
    /// # Arguments
    ///
    /// - `repository` - token repository for DB operations
    /// - `signing_secret` - HMAC key; must match the value used when tokens were created
    pub fn new(repository: Arc<R>, signing_secret: String) -> Self {
        Self {
            repository,
            signing_secret,
        }
    }

    /// Authenticates a raw token and returns the token record.
    ///
    /// The token `name` is the owner id of links created with it. On success
    /// `last_used_at` is touched best-effort.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if the token is unknown or revoked,
    /// [`AuthError::Store`] on store failures.
    pub async fn authenticate(&self, token: &str) -> Result<ApiToken, AuthError> {
        let token_hash = hash_token(&self.signing_secret, token);

        let Some(api_token) = self.repository.find_active(&token_hash).await? else {
            debug!("Rejected unknown or revoked API token");
            return Err(AuthError::InvalidToken);
        };

        if let Err(e) = self.repository.update_last_used(&token_hash).await {
            warn!(token_id = api_token.id, error = %e, "Failed to update token last_used_at");
        }

        Ok(api_token)
    }

    /// Creates a token for `name` and returns it with the raw value.
    ///
    /// The raw value is not stored and cannot be recovered later.
    pub async fn issue_token(&self, name: &str) -> Result<(ApiToken, String), StoreError> {
        let raw = generate_token();
        let token = self
            .repository
            .create_token(name, &hash_token(&self.signing_secret, &raw))
            .await?;
        Ok((token, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockTokenRepository;
    use crate::infrastructure::memory::MemoryTokenRepository;
    use chrono::Utc;

    fn test_secret() -> String {
        "test-signing-secret".to_string()
    }

    fn api_token(name: &str, token_hash: &str) -> ApiToken {
        ApiToken {
            id: 1,
            name: name.to_string(),
            token_hash: token_hash.to_string(),
            created_at: Utc::now(),
            last_used_at: None,
            revoked_at: None,
        }
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let mut mock_repo = MockTokenRepository::new();

        let token = "valid-token";
        let expected_hash = hash_token(&test_secret(), token);
        let stored = api_token("alice", &expected_hash);

        mock_repo
            .expect_find_active()
            .withf(move |hash| hash == expected_hash)
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        mock_repo
            .expect_update_last_used()
            .times(1)
            .returning(|_| Ok(()));

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        let result = service.authenticate(token).await.unwrap();
        assert_eq!(result.name, "alice");
    }

    #[tokio::test]
    async fn test_authenticate_invalid_token() {
        let mut mock_repo = MockTokenRepository::new();

        mock_repo
            .expect_find_active()
            .times(1)
            .returning(|_| Ok(None));
        mock_repo.expect_update_last_used().never();

        let service = AuthService::new(Arc::new(mock_repo), test_secret());

        let result = service.authenticate("invalid-token").await;
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_authenticate_tolerates_last_used_failure() {
        let mut mock_repo = MockTokenRepository::new();
        mock_repo
            .expect_find_active()
            .returning(|hash| Ok(Some(api_token("alice", hash))));
        mock_repo
            .expect_update_last_used()
            .returning(|_| Err(StoreError::Unavailable("read-only replica".to_string())));

        let service = AuthService::new(Arc::new(mock_repo), test_secret());
        assert!(service.authenticate("token").await.is_ok());
    }

    #[tokio::test]
    async fn test_issue_then_authenticate() {
        let service = AuthService::new(Arc::new(MemoryTokenRepository::new()), test_secret());

        let (token, raw) = service.issue_token("alice").await.unwrap();
        assert_eq!(raw.len(), TOKEN_LENGTH);
        assert_ne!(token.token_hash, raw);

        let authenticated = service.authenticate(&raw).await.unwrap();
        assert_eq!(authenticated.id, token.id);
    }

    #[test]
    fn test_hash_token_consistency() {
        let hash1 = hash_token(&test_secret(), "test-token");
        let hash2 = hash_token(&test_secret(), "test-token");

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
        assert_ne!(hash1, hash_token(&test_secret(), "other-token"));
    }

    #[test]
    fn test_hash_token_secret_matters() {
        assert_ne!(hash_token("secret-a", "token"), hash_token("secret-b", "token"));
    }
}
