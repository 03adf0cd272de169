//! Data models
//!
//! Shared between booking-server and API clients.
//! All IDs are opaque strings issued by the server (UUID v4).

pub mod catalog;

// Re-exports
pub use catalog::*;
