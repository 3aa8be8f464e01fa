//! Repository Module
//!
//! Free functions over `&SqlitePool`, one module per aggregate.
//! Handlers translate [`RepoError`] into HTTP responses via `AppError`.

pub mod category;
pub mod dining_table;
pub mod menu_item;
pub mod order;
pub mod payment;
pub mod report;
pub mod setting;
pub mod user;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Whether an sqlx error is a UNIQUE constraint violation on the given
/// `table.column` (SQLite error message names the column).
pub(crate) fn is_unique_violation(err: &sqlx::Error, column: &str) -> bool {
    match err.as_database_error() {
        Some(db_err) => {
            let code_match = db_err
                .code()
                .map(|c| c == "2067" || c == "1555")
                .unwrap_or(false);
            code_match && db_err.message().contains(column)
        }
        None => false,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for repository tests.

    use shared::models::{Role, User};
    use shared::util::{now_millis, snowflake_id};
    use sqlx::SqlitePool;

    pub struct Fixture {
        pub admin_id: i64,
        pub waiter_id: i64,
        pub category_id: i64,
        pub nasi_lemak_id: i64, // price 35000.0
        pub teh_tarik_id: i64,  // price 5000.0
        pub table_id: i64,
    }

    pub async fn sample_user(pool: &SqlitePool, username: &str, role: Role) -> User {
        let now = now_millis();
        let id = snowflake_id();
        sqlx::query(
            "INSERT INTO user (id, username, password_hash, full_name, email, role, is_active, created_at, updated_at) VALUES (?, ?, 'x', ?, ?, ?, 1, ?, ?)",
        )
        .bind(id)
        .bind(username)
        .bind(username)
        .bind(format!("{username}@example.com"))
        .bind(role.as_str())
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .expect("insert user");

        super::user::find_by_id(pool, id)
            .await
            .expect("query user")
            .expect("user exists")
    }

    /// One admin, one waiter, one category, two menu items and one table.
    pub async fn seed(pool: &SqlitePool) -> Fixture {
        let now = now_millis();
        let admin = sample_user(pool, "admin", Role::Admin).await;
        let waiter = sample_user(pool, "waiter", Role::Waiter).await;

        let category_id = snowflake_id();
        sqlx::query(
            "INSERT INTO category (id, name, sort_order, is_active, created_at, updated_at) VALUES (?, 'Mains', 0, 1, ?, ?)",
        )
        .bind(category_id)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .expect("insert category");

        let nasi_lemak_id = snowflake_id();
        sqlx::query(
            "INSERT INTO menu_item (id, category_id, name, price, cost_price, is_available, is_featured, spicy_level, created_at, updated_at) VALUES (?, ?, 'Nasi Lemak', 35000.0, 12000.0, 1, 0, 1, ?, ?)",
        )
        .bind(nasi_lemak_id)
        .bind(category_id)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .expect("insert menu item");

        let teh_tarik_id = snowflake_id();
        sqlx::query(
            "INSERT INTO menu_item (id, category_id, name, price, cost_price, is_available, is_featured, spicy_level, created_at, updated_at) VALUES (?, ?, 'Teh Tarik', 5000.0, 1000.0, 1, 0, 0, ?, ?)",
        )
        .bind(teh_tarik_id)
        .bind(category_id)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .expect("insert menu item");

        let table_id = snowflake_id();
        sqlx::query(
            "INSERT INTO dining_table (id, table_number, capacity, status, created_at, updated_at) VALUES (?, 'T1', 4, 'available', ?, ?)",
        )
        .bind(table_id)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .expect("insert table");

        Fixture {
            admin_id: admin.id,
            waiter_id: waiter.id,
            category_id,
            nasi_lemak_id,
            teh_tarik_id,
            table_id,
        }
    }
}
