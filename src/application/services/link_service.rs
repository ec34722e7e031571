//! Link creation and owner management service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::{info, warn};

use crate::application::services::code_generator::CodeGenerator;
use crate::domain::entities::{ClickSummary, Link, LinkKey, NewLink};
use crate::domain::errors::{LinkError, StoreError};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::utils::extract_domain::{DomainScope, validate_domain_name};
use crate::utils::password::hash_password;
use crate::utils::url_validator::validate_destination_url;

/// Times a generated code is re-drawn after losing an insert race.
const PUT_ATTEMPTS: u32 = 3;

/// Input for [`LinkService::create_link`].
#[derive(Debug, Clone, Default)]
pub struct LinkDraft {
    pub destination_url: String,
    pub custom_alias: Option<String>,
    pub password: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_clicks: Option<i64>,
    pub is_one_time: bool,
    /// Requested host; the default domain and `None` both mean the default.
    pub domain: Option<String>,
}

/// Service for creating short links and managing an owner's links.
pub struct LinkService<L: LinkRepository + ?Sized, C: ClickRepository + ?Sized> {
    link_repository: Arc<L>,
    click_repository: Arc<C>,
    generator: CodeGenerator<L>,
    domains: DomainScope,
}

impl<L: LinkRepository + ?Sized, C: ClickRepository + ?Sized> LinkService<L, C> {
    /// Creates a new link service.
    pub fn new(
        link_repository: Arc<L>,
        click_repository: Arc<C>,
        generator: CodeGenerator<L>,
        domains: DomainScope,
    ) -> Self {
        Self {
            link_repository,
            click_repository,
            generator,
            domains,
        }
    }

    /// Creates a short link.
    ///
    /// # Validation
    ///
    /// - `destination_url` must be an absolute http(s) URL; it is stored verbatim
    /// - `max_clicks` must be positive
    /// - `expires_at` must be in the future
    /// - `is_one_time` implies a budget of one click; any other `max_clicks` is rejected
    /// - an empty password means no password
    ///
    /// # Errors
    ///
    /// - [`LinkError::Validation`] for invalid input
    /// - [`LinkError::AliasConflict`] if the custom alias is taken
    /// - [`LinkError::GenerationExhausted`] if no free code was found
    /// - [`LinkError::Unavailable`] on store failures
    pub async fn create_link(
        &self,
        owner_id: Option<String>,
        draft: LinkDraft,
    ) -> Result<Link, LinkError> {
        validate_destination_url(&draft.destination_url)
            .map_err(|e| LinkError::validation(e.to_string()))?;

        let domain = draft
            .domain
            .as_deref()
            .and_then(|requested| self.domains.scope(requested));
        if let Some(domain) = &domain {
            validate_domain_name(domain)?;
        }

        let max_clicks = click_budget(draft.max_clicks, draft.is_one_time)?;

        if let Some(expires_at) = draft.expires_at
            && expires_at <= Utc::now()
        {
            return Err(LinkError::validation("expiresAt must be in the future"));
        }

        let password_hash = match draft.password.filter(|p| !p.is_empty()) {
            Some(password) => Some(
                tokio::task::spawn_blocking(move || hash_password(&password))
                    .await
                    .map_err(|e| LinkError::Unavailable(e.to_string()))?
                    .map_err(|e| LinkError::Unavailable(e.to_string()))?,
            ),
            None => None,
        };

        for attempt in 1..=PUT_ATTEMPTS {
            let short_code = self
                .generator
                .generate(domain.as_deref(), draft.custom_alias.as_deref())
                .await?;

            let new_link = NewLink {
                short_code,
                domain: domain.clone(),
                destination_url: draft.destination_url.clone(),
                owner_id: owner_id.clone(),
                password_hash: password_hash.clone(),
                expires_at: draft.expires_at,
                max_clicks,
                is_one_time: draft.is_one_time,
            };

            match self.link_repository.put(new_link).await {
                Ok(link) => {
                    counter!("links_created_total").increment(1);
                    info!(
                        link_id = link.id,
                        key = %link.key(),
                        owner = link.owner_id.as_deref().unwrap_or("-"),
                        "Link created"
                    );
                    return Ok(link);
                }
                Err(StoreError::DuplicateKey(_)) if draft.custom_alias.is_some() => {
                    return Err(LinkError::AliasConflict(
                        draft.custom_alias.unwrap_or_default(),
                    ));
                }
                Err(StoreError::DuplicateKey(key)) => {
                    warn!(attempt, %key, "Generated code was taken concurrently; retrying");
                }
                Err(StoreError::Unavailable(message)) => {
                    return Err(LinkError::Unavailable(message));
                }
            }
        }

        Err(LinkError::GenerationExhausted(PUT_ATTEMPTS))
    }

    /// Returns an owner's link and its click summary.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::NotFound`] if the link does not exist or belongs
    /// to someone else.
    pub async fn get_link(
        &self,
        owner_id: &str,
        key: &LinkKey,
    ) -> Result<(Link, ClickSummary), LinkError> {
        let link = self.owned_link(owner_id, key).await?;
        let summary = self.click_repository.summarize(link.id).await?;
        Ok((link, summary))
    }

    /// Lists an owner's links, newest first.
    ///
    /// Returns the page and the total number of the owner's links.
    pub async fn list_links(
        &self,
        owner_id: &str,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Link>, i64), LinkError> {
        let page = i64::from(page.max(1));
        let page_size = i64::from(page_size.max(1));
        let offset = (page - 1) * page_size;

        let links = self
            .link_repository
            .list_by_owner(owner_id, offset, page_size)
            .await?;
        let total = self.link_repository.count_by_owner(owner_id).await?;

        Ok((links, total))
    }

    /// Soft-deletes an owner's link. Deleting an inactive link is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::NotFound`] if the link does not exist or belongs
    /// to someone else.
    pub async fn deactivate_link(&self, owner_id: &str, key: &LinkKey) -> Result<(), LinkError> {
        self.owned_link(owner_id, key).await?;

        if self.link_repository.deactivate(key).await? {
            info!(%key, owner = owner_id, "Link deactivated");
        }

        Ok(())
    }

    /// Scopes a requested host to a link domain.
    pub fn scope_domain(&self, host: Option<&str>) -> Option<String> {
        host.and_then(|h| self.domains.scope(h))
    }

    /// Constructs the public short URL of a link.
    ///
    /// Always uses HTTPS protocol.
    pub fn short_url(&self, link: &Link) -> String {
        format!(
            "https://{}/{}",
            self.domains.display(link.domain.as_deref()),
            link.short_code
        )
    }

    async fn owned_link(&self, owner_id: &str, key: &LinkKey) -> Result<Link, LinkError> {
        self.link_repository
            .find(key)
            .await?
            .filter(|link| link.owner_id.as_deref() == Some(owner_id))
            .ok_or(LinkError::NotFound)
    }
}

/// Resolves the stored click budget from the requested one.
fn click_budget(max_clicks: Option<i64>, is_one_time: bool) -> Result<Option<i64>, LinkError> {
    match (max_clicks, is_one_time) {
        (Some(n), _) if n <= 0 => Err(LinkError::validation("maxClicks must be greater than 0")),
        (Some(n), true) if n != 1 => Err(LinkError::validation(
            "isOneTime links allow exactly one click; maxClicks must be 1 or omitted",
        )),
        (_, true) => Ok(Some(1)),
        (max_clicks, false) => Ok(max_clicks),
    }
}
