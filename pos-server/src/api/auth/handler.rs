//! Authentication Handlers
//!
//! Handles login, logout, and token introspection

use axum::{Extension, Json, extract::State, http::StatusCode};
use serde::Serialize;
use shared::ApiResponse;
use shared::models::{LoginRequest, LoginResponse, Role, User, UserCreate};

use crate::auth::{CurrentUser, hash_password, verify_password};
use crate::core::ServerState;
use crate::db::repository::user as user_repo;
use crate::security_log;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text, validate_password,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, created, ok, ok_with_message};

/// Login handler
///
/// Authenticates user credentials and returns a JWT token. Failed
/// attempts are throttled per username (5 per 15 minutes); a throttled
/// username is rejected before the password is even checked, so correct
/// credentials do not bypass the window.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let username = req.username.trim();

    if !state.login_throttle.check(username) {
        security_log!("WARN", "login_throttled", username = username.to_string());
        return Err(AppError::rate_limited(
            "Too many failed login attempts, try again later",
        ));
    }

    let user = user_repo::find_by_username(&state.pool, username)
        .await
        .map_err(AppError::from)?;

    // Unified error message to prevent username enumeration
    let user = match user {
        Some(u) => u,
        None => {
            state.login_throttle.record_failure(username);
            security_log!(
                "WARN",
                "login_failed",
                username = username.to_string(),
                reason = "user_not_found"
            );
            return Err(AppError::invalid_credentials());
        }
    };

    let password_valid = verify_password(&req.password, &user.password_hash)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
    if !password_valid {
        state.login_throttle.record_failure(username);
        security_log!(
            "WARN",
            "login_failed",
            username = username.to_string(),
            reason = "invalid_credentials"
        );
        return Err(AppError::invalid_credentials());
    }

    // Inactive accounts authenticate but may not enter
    if !user.is_active {
        security_log!("WARN", "login_inactive", username = username.to_string());
        return Err(AppError::forbidden("Account has been disabled"));
    }

    state.login_throttle.reset(username);
    user_repo::touch_last_login(&state.pool, user.id)
        .await
        .map_err(AppError::from)?;

    let token = state
        .get_jwt_service()
        .generate_token(&user)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(
        user_id = user.id,
        username = %user.username,
        role = %user.role,
        "User logged in successfully"
    );

    Ok(ok_with_message(
        LoginResponse { token, user },
        "Login successful",
    ))
}

/// Logout handler
///
/// Stateless JWT: the client discards the token; nothing to revoke
/// server-side.
pub async fn logout(
    Extension(user): Extension<CurrentUser>,
) -> Json<ApiResponse<shared::response::Empty>> {
    tracing::info!(user_id = user.id, username = %user.username, "User logged out");
    ok_with_message(shared::response::Empty, "Logout successful")
}

#[derive(Serialize)]
pub struct TokenCheck {
    pub valid: bool,
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub permissions: Vec<&'static str>,
}

/// GET /api/auth/check - 校验当前令牌
pub async fn check(Extension(user): Extension<CurrentUser>) -> Json<ApiResponse<TokenCheck>> {
    ok(TokenCheck {
        valid: true,
        user_id: user.id,
        username: user.username.clone(),
        role: user.role,
        permissions: user.role.permissions().to_vec(),
    })
}

/// GET /api/auth/me - 当前用户信息
pub async fn me(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<ApiResponse<User>>> {
    let record = user_repo::find_by_id(&state.pool, user.id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", user.id)))?;
    Ok(ok(record))
}

/// POST /api/auth/register - 注册新员工 (仅管理员)
pub async fn register(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentUser>,
    Json(req): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    validate_required_text(&req.username, "username", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&req.full_name, "full_name", MAX_NAME_LEN)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    validate_optional_text(&req.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let role = Role::parse(&req.role)
        .ok_or_else(|| AppError::validation(format!("Unknown role: {}", req.role)))?;

    let password_hash = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

    let user = user_repo::create(
        &state.pool,
        req.username.trim(),
        &password_hash,
        req.full_name.trim(),
        req.email.trim(),
        role,
        req.phone.as_deref(),
    )
    .await
    .map_err(AppError::from)?;

    security_log!(
        "INFO",
        "user_registered",
        admin = admin.username.clone(),
        new_user = user.username.clone(),
        role = user.role.as_str()
    );

    Ok(created(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::auth::{JwtService, LoginThrottle};
    use crate::core::Config;
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

    async fn attempt(
        state: &ServerState,
        username: &str,
        password: &str,
    ) -> AppResult<Json<ApiResponse<LoginResponse>>> {
        login(
            State(state.clone()),
            Json(LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            }),
        )
        .await
    }

    #[tokio::test]
    async fn throttled_username_rejected_before_password_check() {
        let state = test_state().await;
        let hash = hash_password("hunter22").expect("hash");
        user_repo::create(
            &state.pool,
            "carla",
            &hash,
            "Carla",
            "carla@example.com",
            Role::Cashier,
            None,
        )
        .await
        .expect("create user");

        for _ in 0..5 {
            let err = attempt(&state, "carla", "wrong").await.expect_err("bad password");
            assert!(matches!(err, AppError::InvalidCredentials));
        }

        // 第 6 次即使密码正确也应被限流
        let err = attempt(&state, "carla", "hunter22").await.expect_err("throttled");
        assert!(matches!(err, AppError::RateLimited(_)));

        // 清空失败记录后正常登录
        state.login_throttle.reset("carla");
        let resp = attempt(&state, "carla", "hunter22").await.expect("login");
        let body = resp.0;
        assert!(body.success);
        assert!(!body.data.expect("login payload").token.is_empty());
    }
}
