//! Order API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, patch, post, put},
};

use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    // 读取路由：需要 orders:read 权限
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .layer(middleware::from_fn(require_permission("orders:read")));

    // 创建路由：需要 orders:create 权限
    let create_routes = Router::new()
        .route("/", post(handler::create))
        .layer(middleware::from_fn(require_permission("orders:create")));

    // 更新路由：需要 orders:update 权限 (状态机规则在 handler 内检查角色)
    let update_routes = Router::new()
        .route("/{id}/status", patch(handler::set_status))
        .route("/{id}/notes", put(handler::update_notes))
        .layer(middleware::from_fn(require_permission("orders:update")));

    read_routes.merge(create_routes).merge(update_routes)
}
