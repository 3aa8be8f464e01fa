//! Menu Item API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::ApiResponse;
use shared::models::{MenuItemCreate, MenuItemUpdate, MenuItemWithCategory};
use shared::response::Empty;

use crate::core::ServerState;
use crate::db::repository::menu_item::{self as menu_item_repo, MenuItemFilters};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_positive_price,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, created, ok, ok_with_message};

#[derive(Deserialize, Default)]
pub struct ListQuery {
    pub category_id: Option<i64>,
    pub available: Option<bool>,
    /// 按名称或描述模糊搜索
    pub search: Option<String>,
}

/// GET /api/menu-items - 菜品列表 (可过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<MenuItemWithCategory>>>> {
    let filters = MenuItemFilters {
        category_id: query.category_id,
        available: query.available,
        search: query.search,
    };
    let items = menu_item_repo::find_all(&state.pool, filters)
        .await
        .map_err(AppError::from)?;
    Ok(ok(items))
}

/// GET /api/menu-items/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<MenuItemWithCategory>>> {
    let item = menu_item_repo::find_by_id(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Menu item {id} not found")))?;
    Ok(ok(item))
}

/// POST /api/menu-items - 创建菜品
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<MenuItemWithCategory>>)> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;
    validate_positive_price(payload.price, "price")?;
    if let Some(cost_price) = payload.cost_price
        && (!cost_price.is_finite() || cost_price < 0.0)
    {
        return Err(AppError::validation("cost_price cannot be negative"));
    }

    let item = menu_item_repo::create(&state.pool, payload)
        .await
        .map_err(AppError::from)?;
    Ok(created(item))
}

/// PUT /api/menu-items/:id - 更新菜品
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuItemUpdate>,
) -> AppResult<Json<ApiResponse<MenuItemWithCategory>>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;
    if let Some(price) = payload.price {
        validate_positive_price(price, "price")?;
    }

    let item = menu_item_repo::update(&state.pool, id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(ok_with_message(item, "Menu item updated"))
}

/// DELETE /api/menu-items/:id - 删除菜品
///
/// 已被历史订单引用的菜品不允许删除 (改为下架)。
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Empty>>> {
    let deleted = menu_item_repo::delete(&state.pool, id).await.map_err(AppError::from)?;
    if !deleted {
        return Err(AppError::not_found(format!("Menu item {id} not found")));
    }
    Ok(ok_with_message(Empty, "Menu item deleted"))
}
