//! First-run seeding
//!
//! Guarantees a usable admin account on an empty database and the
//! default settings rows.

use crate::auth::hash_password;
use crate::db::repository::{self, RepoResult};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Seed the default admin and settings when the database is fresh.
pub async fn run(pool: &SqlitePool) -> RepoResult<()> {
    repository::setting::ensure_seeded(pool).await?;

    let users = repository::user::count(pool).await?;
    if users > 0 {
        return Ok(());
    }

    let password_hash = hash_password(DEFAULT_ADMIN_PASSWORD)
        .map_err(|e| repository::RepoError::Database(format!("Failed to hash password: {e}")))?;
    let now = now_millis();
    sqlx::query(
        "INSERT INTO user (id, username, password_hash, full_name, email, role, is_active, created_at, updated_at) VALUES (?, ?, ?, 'Administrator', 'admin@localhost', 'admin', 1, ?, ?)",
    )
    .bind(snowflake_id())
    .bind(DEFAULT_ADMIN_USERNAME)
    .bind(&password_hash)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    tracing::warn!(
        "Seeded default admin account '{DEFAULT_ADMIN_USERNAME}'; change its password immediately"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_password;
    use crate::db::test_pool;

    #[tokio::test]
    async fn seeds_admin_only_when_empty() {
        let pool = test_pool().await;

        run(&pool).await.expect("seed");
        let admin = repository::user::find_by_username(&pool, "admin")
            .await
            .expect("q")
            .expect("admin exists");
        assert!(verify_password("admin123", &admin.password_hash).expect("verify"));

        // second run must not duplicate anything
        run(&pool).await.expect("reseed");
        assert_eq!(repository::user::count(&pool).await.expect("count"), 1);
    }
}
