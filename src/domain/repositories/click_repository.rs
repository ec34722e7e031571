//! Repository trait for click persistence.

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::ClickSummary;
use crate::domain::errors::StoreError;
use async_trait::async_trait;

/// Append-only sink for click events.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::MemoryClickRepository`] - in-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends one click. The referrer kind is derived at write time.
    async fn record(&self, event: &ClickEvent) -> Result<(), StoreError>;

    /// Aggregates the clicks recorded for a link.
    async fn summarize(&self, link_id: i64) -> Result<ClickSummary, StoreError>;
}
