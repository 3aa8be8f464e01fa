//! Authentication Routes

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Build authentication router
/// - /api/auth/login: public (no auth required)
/// - /api/auth/me, /api/auth/check, /api/auth/logout: require authentication
/// - /api/auth/register: admin only
pub fn router() -> Router<ServerState> {
    Router::new()
        // Public route - no auth middleware applied
        .route("/api/auth/login", post(handler::login))
        // Protected routes - require authentication (handled by global require_auth middleware)
        .route("/api/auth/me", get(handler::me))
        .route("/api/auth/check", get(handler::check))
        .route("/api/auth/logout", post(handler::logout))
        .route(
            "/api/auth/register",
            post(handler::register).layer(middleware::from_fn(require_admin)),
        )
}
