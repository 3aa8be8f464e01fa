//! Data models
//!
//! Shared between pos-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod category;
pub mod dining_table;
pub mod menu_item;
pub mod order;
pub mod payment;
pub mod setting;
pub mod user;

// Re-exports
pub use category::*;
pub use dining_table::*;
pub use menu_item::*;
pub use order::*;
pub use payment::*;
pub use setting::*;
pub use user::*;
