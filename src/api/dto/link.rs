//! DTOs for link creation and link views.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::LinkDraft;
use crate::domain::entities::{ClickSummary, Link};
use crate::utils::code_generator::{MAX_ALIAS_LENGTH, MIN_ALIAS_LENGTH};
use crate::utils::url_validator::MAX_URL_LENGTH;

// `validator` length bounds are `u64`.
const MAX_URL_LENGTH_U64: u64 = MAX_URL_LENGTH as u64;
const MIN_ALIAS_LENGTH_U64: u64 = MIN_ALIAS_LENGTH as u64;
const MAX_ALIAS_LENGTH_U64: u64 = MAX_ALIAS_LENGTH as u64;

/// Compiled regex for custom alias characters.
static ALIAS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Request body of `POST /links`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    #[validate(length(min = 1, max = MAX_URL_LENGTH_U64, message = "destinationUrl is required"))]
    pub destination_url: String,

    #[validate(length(
        min = MIN_ALIAS_LENGTH_U64,
        max = MAX_ALIAS_LENGTH_U64,
        message = "customAlias must be 3-32 characters"
    ))]
    #[validate(regex(
        path = *ALIAS_REGEX,
        message = "customAlias may only contain letters, digits, '-' and '_'"
    ))]
    pub custom_alias: Option<String>,

    #[validate(length(max = 128, message = "password is too long"))]
    pub password: Option<String>,

    pub expires_at: Option<DateTime<Utc>>,

    #[validate(range(min = 1, message = "maxClicks must be greater than 0"))]
    pub max_clicks: Option<i64>,

    #[serde(default)]
    pub is_one_time: bool,

    #[validate(length(max = 255))]
    pub domain: Option<String>,
}

impl From<CreateLinkRequest> for LinkDraft {
    fn from(req: CreateLinkRequest) -> Self {
        LinkDraft {
            destination_url: req.destination_url,
            custom_alias: req.custom_alias,
            password: req.password,
            expires_at: req.expires_at,
            max_clicks: req.max_clicks,
            is_one_time: req.is_one_time,
            domain: req.domain,
        }
    }
}

/// Public view of a link. Never exposes the password hash.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub short_code: String,
    pub short_url: String,
    pub destination_url: String,
    pub domain: Option<String>,
    pub owner_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<i64>,
    pub click_count: i64,
    pub is_one_time: bool,
    pub active: bool,
    pub password_protected: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkResponse {
    pub fn from_link(link: &Link, short_url: String) -> Self {
        Self {
            short_code: link.short_code.clone(),
            short_url,
            destination_url: link.destination_url.clone(),
            domain: link.domain.clone(),
            owner_id: link.owner_id.clone(),
            expires_at: link.expires_at,
            max_clicks: link.max_clicks,
            click_count: link.click_count,
            is_one_time: link.is_one_time,
            active: link.active,
            password_protected: link.is_password_protected(),
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

/// Click totals of a link, grouped by referrer category.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickSummaryResponse {
    pub total: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
    pub by_referrer: BTreeMap<&'static str, i64>,
}

impl From<ClickSummary> for ClickSummaryResponse {
    fn from(summary: ClickSummary) -> Self {
        Self {
            total: summary.total,
            last_clicked_at: summary.last_clicked_at,
            by_referrer: summary
                .by_referrer
                .into_iter()
                .map(|(kind, count)| (kind.as_str(), count))
                .collect(),
        }
    }
}

/// Response of `GET /links/{code}`.
#[derive(Debug, Serialize)]
pub struct LinkDetailsResponse {
    #[serde(flatten)]
    pub link: LinkResponse,
    pub clicks: ClickSummaryResponse,
}

/// Response of `GET /links`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkListResponse {
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub items: Vec<LinkResponse>,
}

/// `?domain=` selector of the owner endpoints. Absent means the default domain.
#[derive(Debug, Default, Deserialize)]
pub struct DomainQuery {
    pub domain: Option<String>,
}

/// Query of `GET /{code}`.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    pub password: Option<String>,
}
