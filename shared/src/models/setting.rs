//! Setting Model

use serde::{Deserialize, Serialize};

/// Key/value configuration row (运行时配置)
///
/// `setting_type` is advisory ("string", "number", "boolean"); values are
/// stored as text and parsed by consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Setting {
    pub setting_key: String,
    pub setting_value: String,
    pub setting_type: String,
    pub description: Option<String>,
    pub updated_at: i64,
}

/// Upsert payload for a single setting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingUpsert {
    pub setting_key: String,
    pub setting_value: String,
    pub setting_type: Option<String>,
    pub description: Option<String>,
}
