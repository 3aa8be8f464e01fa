//! Payment API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", routes())
}

fn routes() -> Router<ServerState> {
    // 读取路由：需要 payments:read 权限
    let read_routes = Router::new()
        .route("/history", get(handler::history))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission("payments:read")));

    // 收款路由：需要 payments:manage 权限
    let manage_routes = Router::new()
        .route("/", post(handler::process))
        .layer(middleware::from_fn(require_permission("payments:manage")));

    read_routes.merge(manage_routes)
}
