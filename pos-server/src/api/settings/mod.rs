//! Settings API 模块

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::{require_admin, require_permission};
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/settings", routes())
}

fn routes() -> Router<ServerState> {
    // 读取路由：需要 settings:read 权限
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{key}", get(handler::get_by_key))
        .layer(middleware::from_fn(require_permission("settings:read")));

    // 写入路由：仅管理员
    let manage_routes = Router::new()
        .route("/{key}", put(handler::upsert))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}
