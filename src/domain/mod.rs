//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`errors`] - Store, management and resolution error taxonomy
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click tracking event model
//! - [`click_recorder`] - Bounded drop-oldest click queue
//! - [`click_worker`] - Asynchronous click processing worker
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. Repository traits define contracts implemented by the
//! infrastructure layer.
//!
//! # Click Processing Flow
//!
//! 1. A resolution is granted by [`crate::application::services::ResolutionEngine`]
//! 2. The redirect handler hands a [`click_event::ClickEvent`] to [`click_recorder::ClickRecorder`]
//! 3. [`click_worker::run_click_worker`] drains the queue with retry logic
//! 4. Click data is persisted via [`repositories::ClickRepository`]

pub mod click_event;
pub mod click_recorder;
pub mod click_worker;
pub mod entities;
pub mod errors;
pub mod repositories;
