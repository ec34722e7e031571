//! Click classification and per-link click summaries.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use url::Url;

/// Where a click came from, derived from the `Referer` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReferrerKind {
    Direct,
    Search,
    Social,
    Email,
    Website,
}

// Matched against whole host labels, never substrings.
const SEARCH_HOSTS: &[&str] = &["google", "bing", "yahoo", "duckduckgo"];
const SOCIAL_HOSTS: &[&str] = &["facebook", "twitter", "linkedin", "instagram"];
const EMAIL_HOSTS: &[&str] = &["gmail", "outlook", "hotmail"];

impl ReferrerKind {
    /// Classifies a raw referrer value.
    ///
    /// Absent or unparseable referrers count as [`ReferrerKind::Direct`].
    pub fn classify(referrer: Option<&str>) -> Self {
        let Some(host) = referrer
            .and_then(|r| Url::parse(r).ok())
            .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        else {
            return ReferrerKind::Direct;
        };

        // The top-level label never names a service.
        let labels: Vec<&str> = match host.rsplit_once('.') {
            Some((rest, _tld)) => rest.split('.').collect(),
            None => Vec::new(),
        };
        let matches = |names: &[&str]| labels.iter().any(|label| names.contains(label));

        if matches(SEARCH_HOSTS) {
            ReferrerKind::Search
        } else if matches(SOCIAL_HOSTS) {
            ReferrerKind::Social
        } else if matches(EMAIL_HOSTS) {
            ReferrerKind::Email
        } else {
            ReferrerKind::Website
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReferrerKind::Direct => "direct",
            ReferrerKind::Search => "search",
            ReferrerKind::Social => "social",
            ReferrerKind::Email => "email",
            ReferrerKind::Website => "website",
        }
    }

    /// Parses a stored label back; unknown labels fall back to `Direct`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "search" => ReferrerKind::Search,
            "social" => ReferrerKind::Social,
            "email" => ReferrerKind::Email,
            "website" => ReferrerKind::Website,
            _ => ReferrerKind::Direct,
        }
    }
}

/// Aggregated clicks of one link.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickSummary {
    pub total: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
    pub by_referrer: BTreeMap<ReferrerKind, i64>,
}

impl ClickSummary {
    /// Folds one recorded click into the summary.
    pub fn add(&mut self, kind: ReferrerKind, count: i64, last_clicked_at: Option<DateTime<Utc>>) {
        self.total += count;
        *self.by_referrer.entry(kind).or_insert(0) += count;
        self.last_clicked_at = match (self.last_clicked_at, last_clicked_at) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_hosts() {
        assert_eq!(
            ReferrerKind::classify(Some("https://www.google.com/search?q=x")),
            ReferrerKind::Search
        );
        assert_eq!(
            ReferrerKind::classify(Some("https://m.facebook.com/")),
            ReferrerKind::Social
        );
        assert_eq!(
            ReferrerKind::classify(Some("https://mail.google.com/")),
            ReferrerKind::Search
        );
        assert_eq!(
            ReferrerKind::classify(Some("https://outlook.live.com/")),
            ReferrerKind::Email
        );
        assert_eq!(
            ReferrerKind::classify(Some("https://blog.example.org/post")),
            ReferrerKind::Website
        );
    }

    #[test]
    fn test_classify_matches_whole_labels_only() {
        assert_eq!(
            ReferrerKind::classify(Some("https://bingo.com/")),
            ReferrerKind::Website
        );
        assert_eq!(
            ReferrerKind::classify(Some("https://mail.example.com/inbox")),
            ReferrerKind::Website
        );
        assert_eq!(
            ReferrerKind::classify(Some("https://notgoogle.net/")),
            ReferrerKind::Website
        );
        assert_eq!(
            ReferrerKind::classify(Some("https://www.google.co.uk/")),
            ReferrerKind::Search
        );
        assert_eq!(
            ReferrerKind::classify(Some("http://localhost:3000/")),
            ReferrerKind::Website
        );
    }

    #[test]
    fn test_classify_missing_or_garbage_is_direct() {
        assert_eq!(ReferrerKind::classify(None), ReferrerKind::Direct);
        assert_eq!(ReferrerKind::classify(Some("not a url")), ReferrerKind::Direct);
    }

    #[test]
    fn test_label_round_trip() {
        for kind in [
            ReferrerKind::Direct,
            ReferrerKind::Search,
            ReferrerKind::Social,
            ReferrerKind::Email,
            ReferrerKind::Website,
        ] {
            assert_eq!(ReferrerKind::from_label(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_summary_add_accumulates() {
        let earlier = Utc::now() - chrono::Duration::minutes(5);
        let later = Utc::now();

        let mut summary = ClickSummary::default();
        summary.add(ReferrerKind::Direct, 2, Some(earlier));
        summary.add(ReferrerKind::Search, 1, Some(later));
        summary.add(ReferrerKind::Direct, 1, None);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.by_referrer[&ReferrerKind::Direct], 3);
        assert_eq!(summary.by_referrer[&ReferrerKind::Search], 1);
        assert_eq!(summary.last_clicked_at, Some(later));
    }
}
