//! Category Repository

use super::{RepoError, RepoResult};
use shared::models::{Category, CategoryCreate, CategoryUpdate};
use sqlx::SqlitePool;

const CATEGORY_SELECT: &str = "SELECT id, name, description, icon, sort_order, is_active, created_at, updated_at FROM category";

pub async fn find_all(pool: &SqlitePool, include_inactive: bool) -> RepoResult<Vec<Category>> {
    let sql = if include_inactive {
        format!("{CATEGORY_SELECT} ORDER BY sort_order, name")
    } else {
        format!("{CATEGORY_SELECT} WHERE is_active = 1 ORDER BY sort_order, name")
    };
    let rows = sqlx::query_as::<_, Category>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Category>> {
    let sql = format!("{CATEGORY_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Category>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: CategoryCreate) -> RepoResult<Category> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM category WHERE name = ?")
        .bind(&data.name)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Category {} already exists",
            data.name
        )));
    }

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO category (id, name, description, icon, sort_order, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.icon)
    .bind(data.sort_order.unwrap_or(0))
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create category".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: CategoryUpdate) -> RepoResult<Category> {
    if let Some(name) = &data.name {
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM category WHERE name = ? AND id != ?")
                .bind(name)
                .bind(id)
                .fetch_optional(pool)
                .await?;
        if existing.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Category {name} already exists"
            )));
        }
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE category SET name = COALESCE(?1, name), description = COALESCE(?2, description), icon = COALESCE(?3, icon), sort_order = COALESCE(?4, sort_order), is_active = COALESCE(?5, is_active), updated_at = ?6 WHERE id = ?7",
    )
    .bind(&data.name)
    .bind(&data.description)
    .bind(&data.icon)
    .bind(data.sort_order)
    .bind(data.is_active)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Category {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Category {id} not found")))
}

/// Hard delete, guarded: a category with menu items cannot be removed.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let item_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM menu_item WHERE category_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if item_count > 0 {
        return Err(RepoError::Conflict(format!(
            "Category has {item_count} menu items and cannot be deleted"
        )));
    }

    let rows = sqlx::query("DELETE FROM category WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;
    use crate::db::test_pool;

    #[tokio::test]
    async fn duplicate_name_rejected() {
        let pool = test_pool().await;
        testing::seed(&pool).await;

        let err = create(
            &pool,
            CategoryCreate {
                name: "Mains".to_string(),
                description: None,
                icon: None,
                sort_order: None,
            },
        )
        .await
        .expect_err("duplicate");
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn delete_guarded_by_menu_items() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;

        let err = delete(&pool, fx.category_id).await.expect_err("guard");
        assert!(matches!(err, RepoError::Conflict(_)));

        let empty = create(
            &pool,
            CategoryCreate {
                name: "Desserts".to_string(),
                description: None,
                icon: None,
                sort_order: Some(5),
            },
        )
        .await
        .expect("create");
        assert!(delete(&pool, empty.id).await.expect("delete empty"));
    }
}
