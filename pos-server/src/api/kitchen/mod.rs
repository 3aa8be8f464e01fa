//! Kitchen Workflow API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/kitchen", routes())
}

fn routes() -> Router<ServerState> {
    // 读取路由：需要 kitchen:read 权限
    let read_routes = Router::new()
        .route("/orders", get(handler::active_orders))
        .route("/queue", get(handler::item_queue))
        .route("/stats", get(handler::stats))
        .layer(middleware::from_fn(require_permission("kitchen:read")));

    // 操作路由：需要 kitchen:manage 权限
    let manage_routes = Router::new()
        .route("/orders/{id}/start", post(handler::start_order))
        .route("/orders/{id}/complete", post(handler::complete_order))
        .route("/items/{id}/status", patch(handler::set_item_status))
        .layer(middleware::from_fn(require_permission("kitchen:manage")));

    read_routes.merge(manage_routes)
}
