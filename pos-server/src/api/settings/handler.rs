//! Settings API Handlers

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use shared::ApiResponse;
use shared::models::{Setting, SettingUpsert};

use crate::core::ServerState;
use crate::db::repository::setting as setting_repo;
use crate::utils::validation::{MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult, ok, ok_with_message};

/// Flat value shape: key → {value, type, description}
#[derive(Serialize)]
pub struct SettingValue {
    pub value: String,
    #[serde(rename = "type")]
    pub setting_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<Setting> for SettingValue {
    fn from(s: Setting) -> Self {
        Self {
            value: s.setting_value,
            setting_type: s.setting_type,
            description: s.description,
        }
    }
}

/// GET /api/settings - 全部设置 (扁平映射)
pub async fn list(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<BTreeMap<String, SettingValue>>>> {
    // 默认项缺失时补种 (不覆盖已有值)
    setting_repo::ensure_seeded(&state.pool).await.map_err(AppError::from)?;

    let settings = setting_repo::find_all(&state.pool)
        .await
        .map_err(AppError::from)?
        .into_iter()
        .map(|s| (s.setting_key.clone(), SettingValue::from(s)))
        .collect();
    Ok(ok(settings))
}

/// GET /api/settings/:key
pub async fn get_by_key(
    State(state): State<ServerState>,
    Path(key): Path<String>,
) -> AppResult<Json<ApiResponse<SettingValue>>> {
    let setting = setting_repo::find_by_key(&state.pool, &key)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Setting {key} not found")))?;
    Ok(ok(setting.into()))
}

#[derive(Deserialize)]
pub struct UpsertRequest {
    pub value: String,
    #[serde(rename = "type")]
    pub setting_type: Option<String>,
    pub description: Option<String>,
}

/// PUT /api/settings/:key - 新增或更新设置 (仅管理员)
pub async fn upsert(
    State(state): State<ServerState>,
    Path(key): Path<String>,
    Json(req): Json<UpsertRequest>,
) -> AppResult<Json<ApiResponse<SettingValue>>> {
    validate_required_text(&key, "key", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&req.value, "value", MAX_NOTE_LEN)?;
    validate_optional_text(&req.description, "description", MAX_NOTE_LEN)?;

    if let Some(setting_type) = &req.setting_type
        && !matches!(setting_type.as_str(), "string" | "number" | "boolean")
    {
        return Err(AppError::validation(format!(
            "Unknown setting type: {setting_type}"
        )));
    }

    // 数值型设置必须可解析
    let is_number = match &req.setting_type {
        Some(t) => t == "number",
        None => setting_repo::find_by_key(&state.pool, &key)
            .await
            .map_err(AppError::from)?
            .map(|s| s.setting_type == "number")
            .unwrap_or(false),
    };
    if is_number && req.value.parse::<f64>().is_err() {
        return Err(AppError::validation(format!(
            "Setting {key} expects a numeric value"
        )));
    }

    let setting = setting_repo::upsert(
        &state.pool,
        &SettingUpsert {
            setting_key: key,
            setting_value: req.value,
            setting_type: req.setting_type,
            description: req.description,
        },
    )
    .await
    .map_err(AppError::from)?;
    Ok(ok_with_message(setting.into(), "Setting saved"))
}
