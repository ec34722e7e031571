//! Repository trait for short link data access.

use crate::domain::entities::{ClickOutcome, Link, LinkKey, NewLink};
use crate::domain::errors::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Key-value store of links keyed by `(domain, short_code)`.
///
/// At most one *active* record exists per key. Deactivated records are kept,
/// so a key may map to several historical records plus one active one.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryLinkRepository`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Stores a new link.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateKey`] if an active record already holds
    /// the key.
    async fn put(&self, new_link: NewLink) -> Result<Link, StoreError>;

    /// Returns the active link for a key.
    ///
    /// When `key.domain` is set and no record at all exists for that domain,
    /// the default-domain record for the same code is returned instead. A
    /// domain record that exists but is inactive does not fall through.
    async fn get_active(&self, key: &LinkKey) -> Result<Option<Link>, StoreError>;

    /// Returns true if an active record holds exactly this key (no fallback).
    async fn exists(&self, key: &LinkKey) -> Result<bool, StoreError>;

    /// Atomically counts one click on the active record of `key`.
    ///
    /// The increment happens only when the record is active, unexpired at
    /// `now` and under its click budget. One-time links are deactivated in
    /// the same write. Concurrent calls on one key are linearizable.
    async fn increment_clicks(
        &self,
        key: &LinkKey,
        now: DateTime<Utc>,
    ) -> Result<ClickOutcome, StoreError>;

    /// Deactivates the active record of `key`.
    ///
    /// Returns `Ok(true)` if a record changed, `Ok(false)` if none was active.
    async fn deactivate(&self, key: &LinkKey) -> Result<bool, StoreError>;

    /// Returns the current record of `key`, active or not, preferring the
    /// active one. Exact domain match only.
    async fn find(&self, key: &LinkKey) -> Result<Option<Link>, StoreError>;

    /// Lists links of an owner, newest first.
    async fn list_by_owner(
        &self,
        owner_id: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Link>, StoreError>;

    async fn count_by_owner(&self, owner_id: &str) -> Result<i64, StoreError>;

    /// Returns true if the store can serve requests.
    async fn health_check(&self) -> bool;
}
