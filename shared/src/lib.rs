//! Shared types for the booking engine
//!
//! Domain types used by the server and API clients: orders and their
//! lifecycle table, provider schedules, catalog models, and the unified
//! error/response types.

pub mod error;
pub mod models;
pub mod order;
pub mod schedule;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
