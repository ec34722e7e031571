//! Repository trait for API token authentication.

use crate::domain::entities::ApiToken;
use crate::domain::errors::StoreError;
use async_trait::async_trait;

/// Repository interface for API token management.
///
/// Tokens are stored as HMAC-SHA256 hashes, see
/// [`crate::application::services::auth_service::hash_token`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTokenRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryTokenRepository`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Finds a non-revoked token by hash.
    async fn find_active(&self, token_hash: &str) -> Result<Option<ApiToken>, StoreError>;

    /// Updates the last_used timestamp for a token.
    ///
    /// Called after successful authentication to track token usage.
    async fn update_last_used(&self, token_hash: &str) -> Result<(), StoreError>;

    /// Creates a new API token.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateKey`] if the name or hash is taken.
    async fn create_token(&self, name: &str, token_hash: &str) -> Result<ApiToken, StoreError>;

    /// Lists all tokens, oldest first.
    async fn list_tokens(&self) -> Result<Vec<ApiToken>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, StoreError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, StoreError>;

    /// Revokes a token, preventing further authentication.
    ///
    /// Returns `Ok(false)` if the token does not exist or is already revoked.
    async fn revoke_token(&self, id: i64) -> Result<bool, StoreError>;
}
