//! Domain extraction from HTTP request headers and domain scoping.

use crate::domain::errors::LinkError;
use crate::error::AppError;
use axum::http::{HeaderMap, header};

/// Extracts the domain name from HTTP request headers.
///
/// Parses the `Host` header to extract the domain name, handling:
/// - IPv4 addresses (e.g., `192.168.1.1`)
/// - IPv6 addresses (e.g., `[::1]`)
/// - Hostnames with ports (e.g., `example.com:3000`)
/// - Plain hostnames (e.g., `example.com`)
///
/// Port numbers are stripped and the result is lower-cased.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if:
/// - The `Host` header is missing
/// - The header value contains invalid UTF-8
pub fn extract_domain_from_headers(headers: &HeaderMap) -> Result<String, AppError> {
    let host = headers
        .get(header::HOST)
        .ok_or_else(|| AppError::bad_request("Missing Host header", serde_json::json!({})))?
        .to_str()
        .map_err(|_| AppError::bad_request("Invalid Host header", serde_json::json!({})))?;

    Ok(strip_port(host).to_ascii_lowercase())
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // IPv6 address (e.g., [::1] or [::1]:8080)
        match host.find(']') {
            Some(end_bracket) => &host[..=end_bracket],
            None => host,
        }
    } else {
        host.split(':').next().unwrap_or(host)
    }
}

/// Maps request hosts onto link domains.
///
/// The configured default domain is stored as `None`; every other host is a
/// domain of its own.
#[derive(Debug, Clone)]
pub struct DomainScope {
    default_domain: String,
}

impl DomainScope {
    pub fn new(default_domain: impl Into<String>) -> Self {
        Self {
            default_domain: strip_port(&default_domain.into()).to_ascii_lowercase(),
        }
    }

    pub fn default_domain(&self) -> &str {
        &self.default_domain
    }

    /// Returns the link domain for a host: `None` for the default domain.
    pub fn scope(&self, host: &str) -> Option<String> {
        let host = strip_port(host.trim()).to_ascii_lowercase();
        if host.is_empty() || host == self.default_domain {
            None
        } else {
            Some(host)
        }
    }

    /// Host name to show for a link domain.
    pub fn display<'a>(&'a self, domain: Option<&'a str>) -> &'a str {
        domain.unwrap_or(&self.default_domain)
    }
}

/// Validates a domain name requested for a new link.
///
/// # Errors
///
/// Returns [`LinkError::Validation`] for empty, overlong, dotless or
/// non-hostname input.
pub fn validate_domain_name(domain: &str) -> Result<(), LinkError> {
    if domain.is_empty() || domain.len() > 255 {
        return Err(LinkError::validation("Invalid domain name length"));
    }

    if !domain.contains('.') {
        return Err(LinkError::validation(
            "Invalid domain format: domain must contain at least one dot",
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(LinkError::validation("Invalid characters in domain name"));
    }

    Ok(())
}
