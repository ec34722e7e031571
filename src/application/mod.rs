//! Application layer services implementing business logic.
//!
//! Services consume repository traits (as generics, so both concrete stores
//! and `dyn` trait objects work) and provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::resolution_engine::ResolutionEngine`] - Short code resolution and click accounting
//! - [`services::code_generator::CodeGenerator`] - Collision-free code generation
//! - [`services::link_service::LinkService`] - Link creation and owner management
//! - [`services::auth_service::AuthService`] - API token authentication

pub mod services;
