//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{Role, User};
use sqlx::SqlitePool;

const USER_SELECT: &str = "SELECT id, username, password_hash, full_name, email, role, phone, is_active, last_login, created_at, updated_at FROM user";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<User>> {
    let sql = format!("{USER_SELECT} ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE username = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Insert a new user; uniqueness of username and email is checked up front
/// for friendly messages (the schema enforces it regardless).
pub async fn create(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    full_name: &str,
    email: &str,
    role: Role,
    phone: Option<&str>,
) -> RepoResult<User> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM user WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Username {username} is already taken"
        )));
    }
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM user WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Email {email} is already registered"
        )));
    }

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO user (id, username, password_hash, full_name, email, role, phone, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(username)
    .bind(password_hash)
    .bind(full_name)
    .bind(email)
    .bind(role.as_str())
    .bind(phone)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Partial update; `password_hash` replaces the stored hash when provided.
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    full_name: Option<&str>,
    email: Option<&str>,
    role: Option<Role>,
    phone: Option<&str>,
    password_hash: Option<&str>,
    is_active: Option<bool>,
) -> RepoResult<User> {
    if let Some(email) = email {
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM user WHERE email = ? AND id != ?")
                .bind(email)
                .bind(id)
                .fetch_optional(pool)
                .await?;
        if existing.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Email {email} is already registered"
            )));
        }
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE user SET full_name = COALESCE(?1, full_name), email = COALESCE(?2, email), role = COALESCE(?3, role), phone = COALESCE(?4, phone), password_hash = COALESCE(?5, password_hash), is_active = COALESCE(?6, is_active), updated_at = ?7 WHERE id = ?8",
    )
    .bind(full_name)
    .bind(email)
    .bind(role.map(|r| r.as_str()))
    .bind(phone)
    .bind(password_hash)
    .bind(is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

/// Soft delete (deactivate). The row stays for order history joins.
pub async fn deactivate(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE user SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn touch_last_login(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query("UPDATE user SET last_login = ?, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn create_rejects_duplicate_username_and_email() {
        let pool = test_pool().await;
        create(&pool, "maria", "h", "Maria", "maria@example.com", Role::Cashier, None)
            .await
            .expect("first create");

        let err = create(&pool, "maria", "h", "Other", "other@example.com", Role::Waiter, None)
            .await
            .expect_err("duplicate username");
        assert!(matches!(err, RepoError::Duplicate(_)));

        let err = create(&pool, "other", "h", "Other", "maria@example.com", Role::Waiter, None)
            .await
            .expect_err("duplicate email");
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn deactivate_is_soft_and_idempotent() {
        let pool = test_pool().await;
        let user = create(&pool, "maria", "h", "Maria", "maria@example.com", Role::Cashier, None)
            .await
            .expect("create");

        assert!(deactivate(&pool, user.id).await.expect("deactivate"));
        assert!(!deactivate(&pool, user.id).await.expect("second deactivate"));

        let row = find_by_id(&pool, user.id).await.expect("query").expect("row kept");
        assert!(!row.is_active);
    }

    #[tokio::test]
    async fn update_is_partial() {
        let pool = test_pool().await;
        let user = create(&pool, "maria", "h", "Maria", "maria@example.com", Role::Cashier, None)
            .await
            .expect("create");

        let updated = update(&pool, user.id, Some("Maria Lim"), None, None, None, None, None)
            .await
            .expect("update");
        assert_eq!(updated.full_name, "Maria Lim");
        assert_eq!(updated.email, "maria@example.com");
        assert_eq!(updated.role, Role::Cashier);
    }
}
