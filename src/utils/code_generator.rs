//! Short code generation and alias validation utilities.
//!
//! Codes are drawn from the 62-character alphanumeric alphabet, either at
//! random or by base62-encoding a counter.

use crate::domain::errors::LinkError;
use rand::Rng;
use rand::distr::Alphanumeric;

/// Base62 digits in ascending value order.
const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

pub const MIN_ALIAS_LENGTH: usize = 3;
pub const MAX_ALIAS_LENGTH: usize = 32;

/// Codes that cannot be used as aliases.
///
/// These collide with service routes.
pub const RESERVED_ALIASES: &[&str] = &["links", "health", "api", "admin", "metrics", "static"];

/// Generates a random alphanumeric code of `length` characters.
///
/// # Examples
///
/// ```ignore
/// let code = generate_code(6);
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Encodes `value` in base62.
pub fn encode_base62(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(11);
    while value > 0 {
        digits.push(BASE62_ALPHABET[(value % 62) as usize]);
        value /= 62;
    }
    digits.reverse();

    String::from_utf8_lossy(&digits).into_owned()
}

/// Validates a user-provided custom alias.
///
/// # Rules
///
/// - Length: 3-32 characters
/// - Allowed characters: ASCII letters, digits, `-` and `_`
/// - Cannot start or end with `-` or `_`
/// - Cannot be a reserved route word (case-insensitive)
///
/// # Errors
///
/// Returns [`LinkError::Validation`] if any rule is violated.
pub fn validate_custom_alias(alias: &str) -> Result<(), LinkError> {
    if alias.len() < MIN_ALIAS_LENGTH || alias.len() > MAX_ALIAS_LENGTH {
        return Err(LinkError::validation(format!(
            "Custom alias must be {MIN_ALIAS_LENGTH}-{MAX_ALIAS_LENGTH} characters"
        )));
    }

    if !alias
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(LinkError::validation(
            "Custom alias can only contain letters, digits, hyphens and underscores",
        ));
    }

    let is_separator = |c: char| c == '-' || c == '_';
    if alias.starts_with(is_separator) || alias.ends_with(is_separator) {
        return Err(LinkError::validation(
            "Custom alias cannot start or end with a hyphen or underscore",
        ));
    }

    if RESERVED_ALIASES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(alias))
    {
        return Err(LinkError::validation(format!("Alias '{alias}' is reserved")));
    }

    Ok(())
}
