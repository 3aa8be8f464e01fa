//! User Management Handlers (admin only)

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::ApiResponse;
use shared::models::{Role, User, UserUpdate};
use shared::response::Empty;

use crate::auth::{CurrentUser, hash_password};
use crate::core::ServerState;
use crate::db::repository::user as user_repo;
use crate::security_log;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_optional_text, validate_password,
    validate_required_text,
};
use crate::utils::{AppError, AppResult, ok, ok_with_message};

/// GET /api/users - 所有员工账号
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<ApiResponse<Vec<User>>>> {
    let users = user_repo::find_all(&state.pool).await.map_err(AppError::from)?;
    Ok(ok(users))
}

/// GET /api/users/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = user_repo::find_by_id(&state.pool, id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
    Ok(ok(user))
}

/// PUT /api/users/:id - 部分更新
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<UserUpdate>,
) -> AppResult<Json<ApiResponse<User>>> {
    if let Some(full_name) = &req.full_name {
        validate_required_text(full_name, "full_name", MAX_NAME_LEN)?;
    }
    if let Some(email) = &req.email {
        validate_email(email)?;
    }
    validate_optional_text(&req.phone, "phone", MAX_SHORT_TEXT_LEN)?;

    let role = match &req.role {
        Some(r) => Some(
            Role::parse(r).ok_or_else(|| AppError::validation(format!("Unknown role: {r}")))?,
        ),
        None => None,
    };

    let password_hash = match &req.password {
        Some(password) => {
            validate_password(password)?;
            Some(
                hash_password(password)
                    .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?,
            )
        }
        None => None,
    };

    let user = user_repo::update(
        &state.pool,
        id,
        req.full_name.as_deref(),
        req.email.as_deref(),
        role,
        req.phone.as_deref(),
        password_hash.as_deref(),
        req.is_active,
    )
    .await
    .map_err(AppError::from)?;

    Ok(ok_with_message(user, "User updated"))
}

#[derive(Deserialize)]
pub struct PasswordChange {
    pub password: String,
}

/// PUT /api/users/:id/password - 管理员重置密码
pub async fn change_password(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(req): Json<PasswordChange>,
) -> AppResult<Json<ApiResponse<Empty>>> {
    validate_password(&req.password)?;
    let password_hash = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

    user_repo::update(
        &state.pool,
        id,
        None,
        None,
        None,
        None,
        Some(&password_hash),
        None,
    )
    .await
    .map_err(AppError::from)?;

    security_log!(
        "INFO",
        "password_reset",
        admin = admin.username.clone(),
        user_id = id
    );
    Ok(ok_with_message(Empty, "Password updated"))
}

/// DELETE /api/users/:id - 停用账号 (软删除)
///
/// 订单历史仍引用该用户，因此永不物理删除。
pub async fn deactivate(
    State(state): State<ServerState>,
    Extension(admin): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<Empty>>> {
    if admin.id == id {
        return Err(AppError::validation("Cannot deactivate your own account"));
    }

    let changed = user_repo::deactivate(&state.pool, id).await.map_err(AppError::from)?;
    if !changed {
        return Err(AppError::not_found(format!(
            "User {id} not found or already inactive"
        )));
    }

    security_log!(
        "INFO",
        "user_deactivated",
        admin = admin.username.clone(),
        user_id = id
    );
    Ok(ok_with_message(Empty, "User deactivated"))
}
