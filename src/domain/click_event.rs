//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};

/// A click on a short link, captured at the moment a resolution was granted.
///
/// Created by the redirect handler and handed to
/// [`crate::domain::click_recorder::ClickRecorder`]. The background worker
/// persists it later, so the redirect never waits for the click write.
///
/// # Design
///
/// - Carries the resolved `link_id` so the worker needs no lookup
/// - Carries `domain` and `short_code` as requested, for the click log
/// - Client metadata is optional to handle missing headers gracefully
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub link_id: i64,
    pub domain: Option<String>,
    pub short_code: String,
    pub timestamp: DateTime<Utc>,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

impl ClickEvent {
    /// Creates a click event stamped with the current time.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let event = ClickEvent::new(
    ///     42,
    ///     None,
    ///     "abc123".to_string(),
    ///     Some("192.168.1.1".to_string()),
    ///     Some("Mozilla/5.0"),
    ///     Some("https://google.com"),
    /// );
    /// ```
    pub fn new(
        link_id: i64,
        domain: Option<String>,
        short_code: String,
        client_ip: Option<String>,
        user_agent: Option<&str>,
        referrer: Option<&str>,
    ) -> Self {
        Self {
            link_id,
            domain,
            short_code,
            timestamp: Utc::now(),
            client_ip,
            user_agent: user_agent.map(|s| s.to_string()),
            referrer: referrer.map(|s| s.to_string()),
        }
    }
}
