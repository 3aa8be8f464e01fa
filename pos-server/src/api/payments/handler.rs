//! Payment API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::ApiResponse;
use shared::models::{Payment, PaymentCreate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::payment::{self as payment_repo, PaymentHistoryRow};
use crate::utils::time::date_range_millis;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_optional_text};
use crate::utils::{AppError, AppResult, created, ok};

/// POST /api/payments - 收款
///
/// 金额必须与订单总额一致 (容差 0.01)；收款成功后订单完成、堂食桌台释放。
pub async fn process(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<PaymentCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<Payment>>)> {
    validate_optional_text(&payload.transaction_id, "transaction_id", MAX_SHORT_TEXT_LEN)?;

    let payment = payment_repo::process(&state.pool, payload)
        .await
        .map_err(AppError::from)?;

    tracing::info!(
        payment_id = payment.id,
        payment_number = %payment.payment_number,
        order_id = payment.order_id,
        amount = payment.amount,
        method = %payment.payment_method.as_str(),
        cashier = %user.username,
        "Payment processed"
    );
    Ok(created(payment))
}

#[derive(Deserialize, Default)]
pub struct HistoryQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// GET /api/payments/history - 收款历史 (含订单号)
pub async fn history(
    State(state): State<ServerState>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<ApiResponse<Vec<PaymentHistoryRow>>>> {
    let (start_ms, end_ms) = match (&query.start_date, &query.end_date) {
        (Some(start), Some(end)) => {
            let (s, e) = date_range_millis(start, end)?;
            (Some(s), Some(e))
        }
        (None, None) => (None, None),
        _ => {
            return Err(AppError::validation(
                "start_date and end_date must be provided together",
            ));
        }
    };

    let payments = payment_repo::history(&state.pool, start_ms, end_ms, query.limit, query.offset)
        .await
        .map_err(AppError::from)?;
    Ok(ok(payments))
}

/// GET /api/payments/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let payment = payment_repo::find_by_id(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("Payment {id} not found")))?;
    Ok(ok(payment))
}
