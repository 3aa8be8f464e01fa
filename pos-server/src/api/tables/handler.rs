//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::ApiResponse;
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, Order, TableStatus};
use shared::response::Empty;

use crate::core::ServerState;
use crate::db::repository::dining_table as table_repo;
use crate::utils::validation::{
    MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult, created, ok, ok_with_message};

#[derive(Deserialize, Default)]
pub struct ListQuery {
    pub status: Option<TableStatus>,
}

/// GET /api/tables - 桌台列表 (可按状态过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<DiningTable>>>> {
    let tables = table_repo::find_all(&state.pool, query.status)
        .await
        .map_err(AppError::from)?;
    Ok(ok(tables))
}

/// GET /api/tables/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let table = table_repo::find_by_id(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Table {id} not found")))?;
    Ok(ok(table))
}

/// GET /api/tables/:id/current-order - 桌台当前活跃订单
pub async fn current_order(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Option<Order>>>> {
    table_repo::find_by_id(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Table {id} not found")))?;

    let order = table_repo::active_order(&state.pool, id)
        .await
        .map_err(AppError::from)?;
    Ok(ok(order))
}

/// POST /api/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<DiningTable>>)> {
    validate_required_text(&payload.table_number, "table_number", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.location, "location", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.qr_code, "qr_code", MAX_URL_LEN)?;
    if let Some(capacity) = payload.capacity
        && capacity <= 0
    {
        return Err(AppError::validation("capacity must be positive"));
    }

    let table = table_repo::create(&state.pool, payload)
        .await
        .map_err(AppError::from)?;
    Ok(created(table))
}

/// PUT /api/tables/:id - 更新桌台 (状态除外)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    if let Some(table_number) = &payload.table_number {
        validate_required_text(table_number, "table_number", MAX_SHORT_TEXT_LEN)?;
    }
    validate_optional_text(&payload.location, "location", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.qr_code, "qr_code", MAX_URL_LEN)?;
    if let Some(capacity) = payload.capacity
        && capacity <= 0
    {
        return Err(AppError::validation("capacity must be positive"));
    }

    let table = table_repo::update(&state.pool, id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(ok_with_message(table, "Table updated"))
}

#[derive(Deserialize)]
pub struct StatusChange {
    pub status: TableStatus,
}

/// PATCH /api/tables/:id/status - 手动状态调整
///
/// 仅限 reserved / maintenance / available；occupied 由订单流程管理。
pub async fn set_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<StatusChange>,
) -> AppResult<Json<ApiResponse<DiningTable>>> {
    let table = table_repo::set_status(&state.pool, id, req.status)
        .await
        .map_err(AppError::from)?;
    Ok(ok_with_message(table, "Table status updated"))
}

/// DELETE /api/tables/:id - 删除桌台
///
/// 有订单历史的桌台不允许删除。
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Empty>>> {
    let deleted = table_repo::delete(&state.pool, id).await.map_err(AppError::from)?;
    if !deleted {
        return Err(AppError::not_found(format!("Table {id} not found")));
    }
    Ok(ok_with_message(Empty, "Table deleted"))
}
