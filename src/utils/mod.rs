//! Utility functions for code generation, URL processing, and request handling.
//!
//! - [`code_generator`] - Short code generation and alias validation
//! - [`url_validator`] - Destination URL validation
//! - [`extract_domain`] - Domain extraction from HTTP headers and domain scoping
//! - [`client_ip`] - Client IP resolution behind optional proxies
//! - [`password`] - Argon2id password hashing

pub mod client_ip;
pub mod code_generator;
pub mod extract_domain;
pub mod password;
pub mod url_validator;
