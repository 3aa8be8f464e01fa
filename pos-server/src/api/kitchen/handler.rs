//! Kitchen Workflow Handlers
//!
//! The kitchen display works the queue order by order (start/complete)
//! or line by line (per-item status); both paths share the repository's
//! promotion rules.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use shared::ApiResponse;
use shared::models::{ItemStatus, Order, OrderStatus};
use shared::util::now_millis;

use crate::core::ServerState;
use crate::db::repository::order::{
    self as order_repo, KitchenOrderRow, KitchenQueueItem, KitchenStats, OrderItemDetail,
};
use crate::utils::{AppError, AppResult, ok, ok_with_message};

/// Active order enriched with its lines and elapsed minutes for the display
#[derive(Serialize)]
pub struct ActiveOrderEntry {
    #[serde(flatten)]
    pub order: KitchenOrderRow,
    pub elapsed_minutes: i64,
    pub items: Vec<OrderItemDetail>,
}

/// GET /api/kitchen/orders - 待处理订单列表 (先进先出)
pub async fn active_orders(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<ActiveOrderEntry>>>> {
    let now = now_millis();
    let orders = order_repo::kitchen_queue(&state.pool)
        .await
        .map_err(AppError::from)?;
    let mut entries = Vec::with_capacity(orders.len());
    for order in orders {
        let items = order_repo::items_of(&state.pool, order.id)
            .await
            .map_err(AppError::from)?;
        entries.push(ActiveOrderEntry {
            elapsed_minutes: (now - order.created_at) / 60_000,
            order,
            items,
        });
    }
    Ok(ok(entries))
}

#[derive(Deserialize)]
pub struct QueueQuery {
    pub status: Option<ItemStatus>,
}

/// GET /api/kitchen/queue - 菜品级队列, 可按状态过滤
pub async fn item_queue(
    State(state): State<ServerState>,
    Query(query): Query<QueueQuery>,
) -> AppResult<Json<ApiResponse<Vec<KitchenQueueItem>>>> {
    let items = order_repo::kitchen_item_queue(&state.pool, query.status)
        .await
        .map_err(AppError::from)?;
    Ok(ok(items))
}

/// GET /api/kitchen/stats - 厨房工作量统计
pub async fn stats(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<KitchenStats>>> {
    let stats = order_repo::kitchen_stats(&state.pool)
        .await
        .map_err(AppError::from)?;
    Ok(ok(stats))
}

/// POST /api/kitchen/orders/:id/start - 整单开始制作
pub async fn start_order(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = order_repo::transition(&state.pool, id, OrderStatus::Preparing)
        .await
        .map_err(AppError::from)?;
    Ok(ok_with_message(order, "Order preparation started"))
}

/// POST /api/kitchen/orders/:id/complete - 整单出餐
pub async fn complete_order(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = order_repo::transition(&state.pool, id, OrderStatus::Ready)
        .await
        .map_err(AppError::from)?;
    Ok(ok_with_message(order, "Order ready for serving"))
}

#[derive(Deserialize)]
pub struct ItemStatusChange {
    pub status: ItemStatus,
}

/// PATCH /api/kitchen/items/:id/status - 单项状态流转
///
/// 首个开始制作的明细会把订单带入 preparing；最后一个就绪的明细
/// 把订单推进到 ready。
pub async fn set_item_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<ItemStatusChange>,
) -> AppResult<Json<ApiResponse<OrderItemDetail>>> {
    let item = order_repo::advance_item(&state.pool, id, req.status)
        .await
        .map_err(AppError::from)?;
    Ok(ok_with_message(item, "Item status updated"))
}
