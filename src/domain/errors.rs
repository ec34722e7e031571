//! Error taxonomy of the link domain.
//!
//! Repositories fail with [`StoreError`]; services translate those into
//! [`LinkError`] (management operations) or [`ResolutionError`] (redirects).
//! The HTTP boundary maps both onto [`crate::error::AppError`].

use std::fmt;
use thiserror::Error;

/// Why a link that exists can no longer be followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoneReason {
    Expired,
    Exhausted,
}

impl GoneReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoneReason::Expired => "expired",
            GoneReason::Exhausted => "exhausted",
        }
    }
}

impl fmt::Display for GoneReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures reported by link, click and token repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An active record already holds the key.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// The backing store could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return StoreError::DuplicateKey(db.constraint().unwrap_or("unique").to_string());
        }

        StoreError::Unavailable(e.to_string())
    }
}

/// Failures of link management operations.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("short link not found")]
    NotFound,

    #[error("custom alias '{0}' is already taken")]
    AliasConflict(String),

    #[error("could not generate a unique short code after {0} attempts")]
    GenerationExhausted(u32),

    #[error("{0}")]
    Validation(String),

    #[error("link store unavailable: {0}")]
    Unavailable(String),

    /// A store failure the operation does not expect, such as a duplicate
    /// key outside of link creation.
    #[error("internal link store error: {0}")]
    Internal(String),
}

impl LinkError {
    pub fn validation(message: impl Into<String>) -> Self {
        LinkError::Validation(message.into())
    }
}

impl From<StoreError> for LinkError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateKey(key) => {
                LinkError::Internal(format!("unexpected duplicate key {key}"))
            }
            StoreError::Unavailable(message) => LinkError::Unavailable(message),
        }
    }
}

/// Failures of short code resolution.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// Unknown, deleted or deactivated link. These are indistinguishable.
    #[error("short link not found")]
    NotFound,

    #[error("short link is no longer available ({0})")]
    Gone(GoneReason),

    #[error("this link is password protected")]
    PasswordRequired,

    #[error("link store unavailable: {0}")]
    Unavailable(String),
}

impl ResolutionError {
    /// Label used for the `outcome` dimension of the redirect counter.
    pub fn outcome(&self) -> &'static str {
        match self {
            ResolutionError::NotFound => "not_found",
            ResolutionError::Gone(GoneReason::Expired) => "expired",
            ResolutionError::Gone(GoneReason::Exhausted) => "exhausted",
            ResolutionError::PasswordRequired => "password_required",
            ResolutionError::Unavailable(_) => "unavailable",
        }
    }
}

impl From<StoreError> for ResolutionError {
    fn from(e: StoreError) -> Self {
        ResolutionError::Unavailable(e.to_string())
    }
}
