//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`Link`] - A short code mapped to a destination, with access rules
//! - [`LinkKey`] - `(domain, short_code)` identity of a link
//! - [`ClickSummary`] - Aggregated clicks of a link
//! - [`ApiToken`] - Bearer token identifying a link owner
//!
//! Creation uses separate input structs (`NewLink`).

pub mod api_token;
pub mod click;
pub mod link;

pub use api_token::ApiToken;
pub use click::{ClickSummary, ReferrerKind};
pub use link::{ClickOutcome, Link, LinkKey, NewLink};
