//! In-memory implementation of token repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::ApiToken;
use crate::domain::errors::StoreError;
use crate::domain::repositories::TokenRepository;

/// In-process token store keyed by token name.
#[derive(Default)]
pub struct MemoryTokenRepository {
    tokens: DashMap<String, ApiToken>,
    next_id: AtomicI64,
}

impl MemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenRepository for MemoryTokenRepository {
    async fn find_active(&self, token_hash: &str) -> Result<Option<ApiToken>, StoreError> {
        Ok(self
            .tokens
            .iter()
            .find(|entry| entry.token_hash == token_hash && !entry.is_revoked())
            .map(|entry| entry.value().clone()))
    }

    async fn update_last_used(&self, token_hash: &str) -> Result<(), StoreError> {
        for mut entry in self.tokens.iter_mut() {
            if entry.token_hash == token_hash && !entry.is_revoked() {
                entry.last_used_at = Some(Utc::now());
            }
        }
        Ok(())
    }

    async fn create_token(&self, name: &str, token_hash: &str) -> Result<ApiToken, StoreError> {
        if self.tokens.iter().any(|entry| entry.token_hash == token_hash) {
            return Err(StoreError::DuplicateKey("token_hash".to_string()));
        }

        match self.tokens.entry(name.to_string()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateKey(format!("token name '{name}'"))),
            Entry::Vacant(slot) => {
                let token = ApiToken {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
                    name: name.to_string(),
                    token_hash: token_hash.to_string(),
                    created_at: Utc::now(),
                    last_used_at: None,
                    revoked_at: None,
                };
                slot.insert(token.clone());
                Ok(token)
            }
        }
    }

    async fn list_tokens(&self) -> Result<Vec<ApiToken>, StoreError> {
        let mut tokens: Vec<ApiToken> = self.tokens.iter().map(|e| e.value().clone()).collect();
        tokens.sort_by_key(|t| t.id);
        Ok(tokens)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ApiToken>, StoreError> {
        Ok(self
            .tokens
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<ApiToken>, StoreError> {
        Ok(self.tokens.get(name).map(|entry| entry.value().clone()))
    }

    async fn revoke_token(&self, id: i64) -> Result<bool, StoreError> {
        for mut entry in self.tokens.iter_mut() {
            if entry.id == id && !entry.is_revoked() {
                entry.revoked_at = Some(Utc::now());
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_find_revoke() {
        let repo = MemoryTokenRepository::new();
        let token = repo.create_token("alice", "hash-a").await.unwrap();

        assert_eq!(repo.find_active("hash-a").await.unwrap().unwrap().id, token.id);
        assert_eq!(repo.find_by_name("alice").await.unwrap().unwrap().id, token.id);

        assert!(repo.revoke_token(token.id).await.unwrap());
        assert!(!repo.revoke_token(token.id).await.unwrap());
        assert!(repo.find_active("hash-a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_or_hash_rejected() {
        let repo = MemoryTokenRepository::new();
        repo.create_token("alice", "hash-a").await.unwrap();

        assert!(matches!(
            repo.create_token("alice", "hash-b").await,
            Err(StoreError::DuplicateKey(_))
        ));
        assert!(matches!(
            repo.create_token("bob", "hash-a").await,
            Err(StoreError::DuplicateKey(_))
        ));
    }

    #[tokio::test]
    async fn test_update_last_used() {
        let repo = MemoryTokenRepository::new();
        repo.create_token("alice", "hash-a").await.unwrap();
        repo.update_last_used("hash-a").await.unwrap();

        let token = repo.find_by_name("alice").await.unwrap().unwrap();
        assert!(token.last_used_at.is_some());
    }
}
