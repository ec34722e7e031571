//! In-memory implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{ClickOutcome, Link, LinkKey, NewLink};
use crate::domain::errors::StoreError;
use crate::domain::repositories::LinkRepository;

/// In-process link store for development and tests.
///
/// Each key maps to its record history; the last element is the current
/// record and only it may be active. All mutations of a key run under the
/// map's per-key entry lock, which makes them linearizable.
#[derive(Default)]
pub struct MemoryLinkRepository {
    links: DashMap<LinkKey, Vec<Link>>,
    next_id: AtomicI64,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn current(&self, key: &LinkKey) -> Option<Link> {
        self.links
            .get(key)
            .and_then(|records| records.last().cloned())
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn put(&self, new_link: NewLink) -> Result<Link, StoreError> {
        let key = new_link.key();
        let mut records = self.links.entry(key.clone()).or_default();

        if records.last().is_some_and(|link| link.active) {
            return Err(StoreError::DuplicateKey(key.to_string()));
        }

        let now = Utc::now();
        let link = Link {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            short_code: new_link.short_code,
            domain: new_link.domain,
            destination_url: new_link.destination_url,
            owner_id: new_link.owner_id,
            password_hash: new_link.password_hash,
            expires_at: new_link.expires_at,
            max_clicks: new_link.max_clicks,
            click_count: 0,
            is_one_time: new_link.is_one_time,
            active: true,
            created_at: now,
            updated_at: now,
        };

        records.push(link.clone());
        Ok(link)
    }

    async fn get_active(&self, key: &LinkKey) -> Result<Option<Link>, StoreError> {
        if let Some(link) = self.current(key) {
            return Ok(Some(link).filter(|l| l.active));
        }

        Ok(key
            .fallback()
            .and_then(|fallback| self.current(&fallback))
            .filter(|l| l.active))
    }

    async fn exists(&self, key: &LinkKey) -> Result<bool, StoreError> {
        Ok(self.current(key).is_some_and(|l| l.active))
    }

    async fn increment_clicks(
        &self,
        key: &LinkKey,
        now: DateTime<Utc>,
    ) -> Result<ClickOutcome, StoreError> {
        let Some(mut records) = self.links.get_mut(key) else {
            return Ok(ClickOutcome::Inactive);
        };
        let Some(link) = records.last_mut().filter(|l| l.active) else {
            return Ok(ClickOutcome::Inactive);
        };

        if link.is_expired_at(now) {
            return Ok(ClickOutcome::Expired);
        }
        if link.is_exhausted() {
            return Ok(ClickOutcome::Exhausted);
        }

        link.click_count += 1;
        if link.is_one_time {
            link.active = false;
        }
        link.updated_at = now;

        Ok(ClickOutcome::Counted {
            click_count: link.click_count,
            deactivated: !link.active,
        })
    }

    async fn deactivate(&self, key: &LinkKey) -> Result<bool, StoreError> {
        let Some(mut records) = self.links.get_mut(key) else {
            return Ok(false);
        };

        match records.last_mut() {
            Some(link) if link.active => {
                link.active = false;
                link.updated_at = Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find(&self, key: &LinkKey) -> Result<Option<Link>, StoreError> {
        Ok(self.current(key))
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Link>, StoreError> {
        let mut owned: Vec<Link> = self
            .links
            .iter()
            .flat_map(|entry| entry.value().clone())
            .filter(|link| link.owner_id.as_deref() == Some(owner_id))
            .collect();

        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(owned
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_by_owner(&self, owner_id: &str) -> Result<i64, StoreError> {
        let count = self
            .links
            .iter()
            .map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter(|link| link.owner_id.as_deref() == Some(owner_id))
                    .count()
            })
            .sum::<usize>();

        Ok(count as i64)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
