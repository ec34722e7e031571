//! Destination URL validation.
//!
//! Destinations are checked but stored exactly as submitted, so a resolved
//! redirect points at the same string the creator sent.

use url::Url;

/// Longest destination URL accepted.
pub const MAX_URL_LENGTH: usize = 2048;

/// Errors that can occur during URL validation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,

    #[error("URL must not contain whitespace or control characters")]
    IllegalCharacters,

    #[error("URL exceeds {MAX_URL_LENGTH} characters")]
    TooLong,
}

/// Validates a destination URL.
///
/// # Rules
///
/// 1. At most [`MAX_URL_LENGTH`] bytes
/// 2. No whitespace or control characters anywhere
/// 3. Parses as an absolute URL
/// 4. Scheme is `http` or `https`
/// 5. Has a non-empty host
///
/// Rejects potentially dangerous schemes like `javascript:`, `data:` or `file:`.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_destination_url("https://example.com/Path?q=1").is_ok());
/// assert!(validate_destination_url("javascript:alert(1)").is_err());
/// ```
pub fn validate_destination_url(input: &str) -> Result<(), UrlValidationError> {
    if input.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    if input.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(UrlValidationError::IllegalCharacters);
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(UrlValidationError::UnsupportedProtocol);
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlValidationError::MissingHost),
    }
}
