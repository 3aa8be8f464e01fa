//! Dashboard API 模块

use axum::{Json, Router, extract::State, middleware, routing::get};
use shared::ApiResponse;

use crate::auth::require_permission;
use crate::core::ServerState;
use crate::db::repository::report::{self as report_repo, DashboardStats};
use crate::utils::{AppError, AppResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/dashboard", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/stats", get(stats))
        .layer(middleware::from_fn(require_permission("dashboard:read")))
}

/// GET /api/dashboard/stats - 今日概览
///
/// 今日订单数/营收 (不含已取消)、活跃订单、桌台占用、今日收款额。
pub async fn stats(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<DashboardStats>>> {
    let stats = report_repo::dashboard_stats(&state.pool)
        .await
        .map_err(AppError::from)?;
    Ok(ok(stats))
}
