//! Business logic services for the application layer.

pub mod auth_service;
pub mod code_generator;
pub mod link_service;
pub mod resolution_engine;

pub use auth_service::AuthService;
pub use code_generator::{CodeGenerator, CodeStrategy};
pub use link_service::{LinkDraft, LinkService};
pub use resolution_engine::{Resolution, ResolutionEngine};
