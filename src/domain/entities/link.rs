//! Link entity representing a short code mapped to a destination URL.

use chrono::{DateTime, Utc};
use std::fmt;

/// Identifies a link: a short code scoped to a domain.
///
/// `domain: None` is the default (shared) domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkKey {
    pub domain: Option<String>,
    pub code: String,
}

impl LinkKey {
    /// Creates a key for `code` under `domain`.
    pub fn new(domain: Option<String>, code: impl Into<String>) -> Self {
        Self {
            domain,
            code: code.into(),
        }
    }

    /// Creates a key for `code` under the default domain.
    pub fn default_domain(code: impl Into<String>) -> Self {
        Self::new(None, code)
    }

    /// Returns the same code under the default domain, or `None` if this key
    /// already points at the default domain.
    pub fn fallback(&self) -> Option<LinkKey> {
        self.domain
            .as_ref()
            .map(|_| LinkKey::default_domain(self.code.clone()))
    }
}

impl fmt::Display for LinkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.domain {
            Some(domain) => write!(f, "{}/{}", domain, self.code),
            None => write!(f, "<default>/{}", self.code),
        }
    }
}

/// A short link with its access rules and click budget.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: i64,
    pub short_code: String,
    pub domain: Option<String>,
    pub destination_url: String,
    pub owner_id: Option<String>,
    /// Argon2id PHC string; `None` when the link is not password protected.
    pub password_hash: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<i64>,
    pub click_count: i64,
    pub is_one_time: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Returns the store key of this link.
    pub fn key(&self) -> LinkKey {
        LinkKey::new(self.domain.clone(), self.short_code.clone())
    }

    /// Returns true if the link has passed its expiry time at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    /// Returns true if the click budget is used up.
    pub fn is_exhausted(&self) -> bool {
        self.max_clicks.is_some_and(|max| self.click_count >= max)
    }

    pub fn is_password_protected(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Input data for storing a new link.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub short_code: String,
    pub domain: Option<String>,
    pub destination_url: String,
    pub owner_id: Option<String>,
    pub password_hash: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<i64>,
    pub is_one_time: bool,
}

impl NewLink {
    pub fn key(&self) -> LinkKey {
        LinkKey::new(self.domain.clone(), self.short_code.clone())
    }
}

/// Result of an atomic click increment against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The click was counted. `deactivated` is set when the same write
    /// disabled a one-time link.
    Counted { click_count: i64, deactivated: bool },
    /// The click budget was already used up.
    Exhausted,
    /// The link expired before the write.
    Expired,
    /// No active record holds the key.
    Inactive,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn link() -> Link {
        let now = Utc::now();
        Link {
            id: 1,
            short_code: "abc123".to_string(),
            domain: None,
            destination_url: "https://example.com".to_string(),
            owner_id: None,
            password_hash: None,
            expires_at: None,
            max_clicks: None,
            click_count: 0,
            is_one_time: false,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_key_uses_domain_and_code() {
        let mut link = link();
        link.domain = Some("go.example.com".to_string());

        let key = link.key();
        assert_eq!(key.domain.as_deref(), Some("go.example.com"));
        assert_eq!(key.code, "abc123");
        assert_eq!(key.to_string(), "go.example.com/abc123");
    }

    #[test]
    fn test_fallback_points_at_default_domain() {
        let key = LinkKey::new(Some("go.example.com".to_string()), "abc");
        assert_eq!(key.fallback(), Some(LinkKey::default_domain("abc")));
        assert_eq!(LinkKey::default_domain("abc").fallback(), None);
    }

    #[test]
    fn test_link_without_expiry_never_expires() {
        assert!(!link().is_expired_at(Utc::now() + Duration::days(3650)));
    }

    #[test]
    fn test_link_is_expired() {
        let mut link = link();
        let now = Utc::now();
        link.expires_at = Some(now - Duration::seconds(1));
        assert!(link.is_expired_at(now));
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let mut link = link();
        let at = Utc::now();
        link.expires_at = Some(at);
        assert!(link.is_expired_at(at));
        assert!(!link.is_expired_at(at - Duration::milliseconds(1)));
    }

    #[test]
    fn test_exhausted_when_budget_used() {
        let mut link = link();
        assert!(!link.is_exhausted());

        link.max_clicks = Some(2);
        link.click_count = 1;
        assert!(!link.is_exhausted());

        link.click_count = 2;
        assert!(link.is_exhausted());
    }
}
