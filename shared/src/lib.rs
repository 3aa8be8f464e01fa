//! Shared types for the POS system
//!
//! Domain models, API payloads and the unified response envelope used by
//! pos-server and its clients. Database derives are gated behind the `db`
//! feature so client-side consumers stay free of sqlx.

pub mod models;
pub mod response;
pub mod util;

// Re-exports
pub use response::ApiResponse;
pub use serde::{Deserialize, Serialize};
