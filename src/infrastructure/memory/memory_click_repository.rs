//! In-memory implementation of click repository.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::{ClickSummary, ReferrerKind};
use crate::domain::errors::StoreError;
use crate::domain::repositories::ClickRepository;

/// In-process click log keyed by link id.
#[derive(Default)]
pub struct MemoryClickRepository {
    clicks: DashMap<i64, Vec<ClickEvent>>,
}

impl MemoryClickRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clicks recorded for a link, oldest first.
    pub fn events_for(&self, link_id: i64) -> Vec<ClickEvent> {
        self.clicks
            .get(&link_id)
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Total clicks recorded across all links.
    pub fn len(&self) -> usize {
        self.clicks.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ClickRepository for MemoryClickRepository {
    async fn record(&self, event: &ClickEvent) -> Result<(), StoreError> {
        self.clicks
            .entry(event.link_id)
            .or_default()
            .push(event.clone());
        Ok(())
    }

    async fn summarize(&self, link_id: i64) -> Result<ClickSummary, StoreError> {
        let mut summary = ClickSummary::default();

        if let Some(events) = self.clicks.get(&link_id) {
            for event in events.iter() {
                let kind = ReferrerKind::classify(event.referrer.as_deref());
                summary.add(kind, 1, Some(event.timestamp));
            }
        }

        Ok(summary)
    }
}
