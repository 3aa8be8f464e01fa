//! Category API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::ApiResponse;
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use shared::response::Empty;

use crate::core::ServerState;
use crate::db::repository::category as category_repo;
use crate::utils::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult, created, ok, ok_with_message};

#[derive(Deserialize, Default)]
pub struct ListQuery {
    /// 包含停用分类 (默认只返回启用中的)
    #[serde(default)]
    pub include_inactive: bool,
}

/// GET /api/categories - 获取所有分类
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Category>>>> {
    let categories = category_repo::find_all(&state.pool, query.include_inactive)
        .await
        .map_err(AppError::from)?;
    Ok(ok(categories))
}

/// GET /api/categories/:id - 获取单个分类
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let category = category_repo::find_by_id(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Category {id} not found")))?;
    Ok(ok(category))
}

/// POST /api/categories - 创建分类
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let category = category_repo::create(&state.pool, payload)
        .await
        .map_err(AppError::from)?;
    Ok(created(category))
}

/// PUT /api/categories/:id - 更新分类
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<ApiResponse<Category>>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let category = category_repo::update(&state.pool, id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(ok_with_message(category, "Category updated"))
}

/// DELETE /api/categories/:id - 删除分类
///
/// 仍有菜品引用该分类时返回 409。
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Empty>>> {
    let deleted = category_repo::delete(&state.pool, id).await.map_err(AppError::from)?;
    if !deleted {
        return Err(AppError::not_found(format!("Category {id} not found")));
    }
    Ok(ok_with_message(Empty, "Category deleted"))
}
