//! Resolution of short codes to destination URLs.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error};

use crate::domain::entities::{ClickOutcome, Link, LinkKey};
use crate::domain::errors::{GoneReason, ResolutionError};
use crate::domain::repositories::LinkRepository;
use crate::utils::password::verify_password;

/// A granted resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub destination_url: String,
    /// The link as it stands after this click was counted.
    pub link: Link,
}

/// Decides whether a short code may be followed and counts the click.
///
/// # Stages
///
/// `LOOKUP -> CHECK_ACTIVE -> CHECK_EXPIRY -> CHECK_CLICK_BUDGET ->
/// CHECK_PASSWORD -> GRANT`
///
/// Every stage but `GRANT` is a read. `GRANT` is one conditional write in the
/// store, and its outcome wins over anything read earlier: a request that
/// passed the checks but lost a race for the last click is denied there.
pub struct ResolutionEngine<L: LinkRepository + ?Sized> {
    repository: Arc<L>,
}

impl<L: LinkRepository + ?Sized> ResolutionEngine<L> {
    pub fn new(repository: Arc<L>) -> Self {
        Self { repository }
    }

    /// Resolves `code` under `domain` (`None` = default domain).
    ///
    /// # Errors
    ///
    /// - [`ResolutionError::NotFound`] for unknown, deleted or deactivated links
    /// - [`ResolutionError::Gone`] for expired or exhausted links
    /// - [`ResolutionError::PasswordRequired`] when the password is absent or
    ///   wrong; no click is counted
    /// - [`ResolutionError::Unavailable`] when the store fails
    pub async fn resolve(
        &self,
        domain: Option<&str>,
        code: &str,
        password: Option<&str>,
    ) -> Result<Resolution, ResolutionError> {
        let key = LinkKey::new(domain.map(str::to_owned), code);

        let Some(link) = self.repository.get_active(&key).await? else {
            debug!(%key, "Resolution denied: lookup miss");
            return Err(ResolutionError::NotFound);
        };

        if !link.active {
            debug!(%key, "Resolution denied: inactive");
            return Err(ResolutionError::NotFound);
        }

        let now = Utc::now();
        if link.is_expired_at(now) {
            debug!(%key, "Resolution denied: expired");
            return Err(ResolutionError::Gone(GoneReason::Expired));
        }

        if link.is_exhausted() {
            debug!(%key, "Resolution denied: click budget exhausted");
            return Err(ResolutionError::Gone(GoneReason::Exhausted));
        }

        check_password(&link, password).await?;

        // Password verification takes a while; the store re-checks expiry
        // against the time of the write.
        let granted_at = Utc::now();

        // The fallback lookup may have found the default-domain record, so
        // the increment targets the record's own key.
        match self.repository.increment_clicks(&link.key(), granted_at).await? {
            ClickOutcome::Counted {
                click_count,
                deactivated,
            } => {
                debug!(%key, click_count, deactivated, "Resolution granted");
                Ok(Resolution {
                    destination_url: link.destination_url.clone(),
                    link: Link {
                        click_count,
                        active: !deactivated,
                        updated_at: granted_at,
                        ..link
                    },
                })
            }
            ClickOutcome::Exhausted => Err(ResolutionError::Gone(GoneReason::Exhausted)),
            ClickOutcome::Expired => Err(ResolutionError::Gone(GoneReason::Expired)),
            ClickOutcome::Inactive => Err(ResolutionError::NotFound),
        }
    }
}

async fn check_password(link: &Link, password: Option<&str>) -> Result<(), ResolutionError> {
    let Some(hash) = link.password_hash.clone() else {
        return Ok(());
    };

    let Some(candidate) = password.filter(|p| !p.is_empty()).map(str::to_owned) else {
        debug!(code = %link.short_code, "Resolution denied: password required");
        return Err(ResolutionError::PasswordRequired);
    };

    let verified = tokio::task::spawn_blocking(move || verify_password(&candidate, &hash))
        .await
        .map_err(|e| ResolutionError::Unavailable(format!("password check failed: {e}")))?;

    match verified {
        Ok(true) => Ok(()),
        Ok(false) => {
            debug!(code = %link.short_code, "Resolution denied: wrong password");
            Err(ResolutionError::PasswordRequired)
        }
        Err(e) => {
            error!(link_id = link.id, error = %e, "Stored password hash is unusable");
            Err(ResolutionError::PasswordRequired)
        }
    }
}
