//! In-memory repository implementations.
//!
//! Single-process stores used with `STORAGE_BACKEND=memory` and in tests.
//! Data is lost on restart.

pub mod memory_click_repository;
pub mod memory_link_repository;
pub mod memory_token_repository;

pub use memory_click_repository::MemoryClickRepository;
pub use memory_link_repository::MemoryLinkRepository;
pub use memory_token_repository::MemoryTokenRepository;
