//! Order API Handlers
//!
//! Route-level permissions gate access; the status handler applies the
//! finer role rules (kitchen transitions, cashier/admin cancels, waiter
//! cancel-own-pending).

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::ApiResponse;
use shared::models::{Order, OrderCreate, OrderStatus, Role};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::order::{self as order_repo, OrderDetail, OrderFilters, OrderListRow};
use crate::db::repository::setting as setting_repo;
use crate::security_log;
use crate::utils::time::{date_range_millis, day_end_millis, day_start_millis, today};
use crate::utils::validation::{MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult, created, ok, ok_with_message};

/// Fallback rates when the settings rows are missing
const DEFAULT_TAX_RATE: f64 = 0.10;
const DEFAULT_SERVICE_RATE: f64 = 0.05;

#[derive(Deserialize, Default)]
pub struct ListQuery {
    pub status: Option<OrderStatus>,
    pub table_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// GET /api/orders - 订单列表 (可过滤)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<OrderListRow>>>> {
    let (start_ms, end_ms) = match (&query.start_date, &query.end_date) {
        (Some(start), Some(end)) => {
            let (s, e) = date_range_millis(start, end)?;
            (Some(s), Some(e))
        }
        // 不带日期时默认查询今天
        (None, None) => {
            let date = today();
            (Some(day_start_millis(date)), Some(day_end_millis(date)))
        }
        _ => {
            return Err(AppError::validation(
                "start_date and end_date must be provided together",
            ));
        }
    };

    let filters = OrderFilters {
        status: query.status,
        table_id: query.table_id,
        start_ms,
        end_ms,
        limit: query.limit,
        offset: query.offset,
    };
    let orders = order_repo::find_all(&state.pool, filters)
        .await
        .map_err(AppError::from)?;
    Ok(ok(orders))
}

/// GET /api/orders/:id - 订单详情 (含明细)
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let detail = order_repo::find_detail(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;
    Ok(ok(detail))
}

/// POST /api/orders - 创建订单
///
/// 单价由服务端从菜单读取；税率/服务费率来自系统设置。
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<OrderDetail>>)> {
    validate_optional_text(&payload.customer_name, "customer_name", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.customer_phone, "customer_phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    for item in &payload.items {
        validate_optional_text(&item.notes, "item notes", MAX_NOTE_LEN)?;
    }

    let tax_rate = setting_repo::get_f64(&state.pool, "tax_rate", DEFAULT_TAX_RATE)
        .await
        .map_err(AppError::from)?;
    let service_rate =
        setting_repo::get_f64(&state.pool, "service_charge_rate", DEFAULT_SERVICE_RATE)
            .await
            .map_err(AppError::from)?;

    let detail = order_repo::create(&state.pool, user.id, payload, tax_rate, service_rate)
        .await
        .map_err(AppError::from)?;

    tracing::info!(
        order_id = detail.order.id,
        order_number = %detail.order.order_number,
        total = detail.order.total,
        waiter = %user.username,
        "Order created"
    );
    Ok(created(detail))
}

#[derive(Deserialize)]
pub struct StatusChange {
    pub status: OrderStatus,
}

/// PATCH /api/orders/:id/status - 订单状态流转
///
/// 角色规则：
/// - preparing / ready: 仅厨房和管理员
/// - completed: 禁止 (完成只能通过支付接口)
/// - cancelled: 管理员/收银员可取消任意未终结订单；服务员只能取消自己的 pending 订单
pub async fn set_status(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<StatusChange>,
) -> AppResult<Json<ApiResponse<Order>>> {
    match req.status {
        OrderStatus::Preparing | OrderStatus::Ready => {
            if !matches!(user.role, Role::Kitchen | Role::Admin) {
                return Err(AppError::forbidden(
                    "Only kitchen staff can update preparation status",
                ));
            }
        }
        OrderStatus::Completed => {
            return Err(AppError::validation(
                "Orders are completed through payment, not status change",
            ));
        }
        OrderStatus::Cancelled => {
            match user.role {
                Role::Admin | Role::Cashier => {}
                Role::Waiter => {
                    let order = order_repo::find_by_id(&state.pool, id)
                        .await
                        .map_err(AppError::from)?
                        .ok_or_else(|| AppError::not_found(format!("Order {id} not found")))?;
                    if order.user_id != user.id || order.status != OrderStatus::Pending {
                        return Err(AppError::forbidden(
                            "Waiters may only cancel their own pending orders",
                        ));
                    }
                }
                Role::Kitchen => {
                    return Err(AppError::forbidden("Kitchen staff cannot cancel orders"));
                }
            }
            security_log!(
                "INFO",
                "order_cancelled",
                order_id = id,
                by = user.username.clone()
            );
        }
        OrderStatus::Pending => {
            // fall through; the state machine rejects any move back to pending
        }
    }

    let order = order_repo::transition(&state.pool, id, req.status)
        .await
        .map_err(AppError::from)?;
    Ok(ok_with_message(order, "Order status updated"))
}

#[derive(Deserialize)]
pub struct NotesChange {
    pub notes: Option<String>,
}

/// PUT /api/orders/:id/notes - 更新订单备注 (仅活跃订单)
pub async fn update_notes(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<NotesChange>,
) -> AppResult<Json<ApiResponse<Order>>> {
    validate_optional_text(&req.notes, "notes", MAX_NOTE_LEN)?;
    let order = order_repo::update_notes(&state.pool, id, req.notes.as_deref())
        .await
        .map_err(AppError::from)?;
    Ok(ok_with_message(order, "Order notes updated"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use shared::models::{OrderItemCreate, OrderType};

    use crate::auth::{JwtService, LoginThrottle};
    use crate::core::Config;
    use crate::db::repository::testing;
    use crate::db::test_pool;

    async fn test_state() -> ServerState {
        let config = Config::from_env();
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        ServerState::new(
            config,
            test_pool().await,
            jwt_service,
            Arc::new(LoginThrottle::default()),
        )
    }

    #[tokio::test]
    async fn list_defaults_to_today() {
        let state = test_state().await;
        let fx = testing::seed(&state.pool).await;

        let detail = order_repo::create(
            &state.pool,
            fx.waiter_id,
            shared::models::OrderCreate {
                table_id: None,
                customer_name: None,
                customer_phone: None,
                order_type: OrderType::Takeaway,
                items: vec![OrderItemCreate {
                    menu_item_id: fx.teh_tarik_id,
                    quantity: 1,
                    notes: None,
                }],
                discount: 0.0,
                notes: None,
            },
            0.10,
            0.05,
        )
        .await
        .expect("create");

        let listed = list(State(state.clone()), Query(ListQuery::default()))
            .await
            .expect("list");
        assert_eq!(listed.0.data.as_ref().expect("rows").len(), 1);

        // 把订单改到前天, 默认查询不应再返回它
        let two_days_ms = 2 * 24 * 3600 * 1000_i64;
        sqlx::query("UPDATE orders SET created_at = created_at - ? WHERE id = ?")
            .bind(two_days_ms)
            .bind(detail.order.id)
            .execute(&state.pool)
            .await
            .expect("backdate");

        let listed = list(State(state.clone()), Query(ListQuery::default()))
            .await
            .expect("list");
        assert!(listed.0.data.as_ref().expect("rows").is_empty());

        let start = (today() - chrono::Days::new(2)).format("%Y-%m-%d").to_string();
        let end = today().format("%Y-%m-%d").to_string();
        let listed = list(
            State(state.clone()),
            Query(ListQuery {
                start_date: Some(start),
                end_date: Some(end),
                ..ListQuery::default()
            }),
        )
        .await
        .expect("list");
        assert_eq!(listed.0.data.as_ref().expect("rows").len(), 1);
    }
}
