//! In-memory storage implementations
//!
//! Suitable for development and testing; nothing survives a restart.

mod admin;

pub use admin::MemoryAdminStorage;
