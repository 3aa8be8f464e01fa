//! Report API 模块

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reports", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/summary", get(handler::summary))
        .route("/sales-trend", get(handler::sales_trend))
        .route("/menu-performance", get(handler::menu_performance))
        .route("/category-breakdown", get(handler::category_breakdown))
        .route("/transactions", get(handler::transactions))
        .route("/export", get(handler::export))
        .layer(middleware::from_fn(require_permission("reports:read")))
}
