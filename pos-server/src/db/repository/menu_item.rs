//! Menu Item Repository

use super::{RepoError, RepoResult};
use shared::models::{MenuItemCreate, MenuItemUpdate, MenuItemWithCategory};
use sqlx::SqlitePool;

const MENU_ITEM_SELECT: &str = "SELECT mi.id, mi.category_id, c.name as category_name, mi.name, mi.description, mi.price, mi.cost_price, mi.image, mi.is_available, mi.is_featured, mi.preparation_time, mi.spicy_level, mi.calories, mi.created_at, mi.updated_at FROM menu_item mi JOIN category c ON mi.category_id = c.id";

/// List filters; all optional and combined with AND.
#[derive(Debug, Default, Clone)]
pub struct MenuItemFilters {
    pub category_id: Option<i64>,
    pub available: Option<bool>,
    pub search: Option<String>,
}

pub async fn find_all(
    pool: &SqlitePool,
    filters: MenuItemFilters,
) -> RepoResult<Vec<MenuItemWithCategory>> {
    let mut sql = format!("{MENU_ITEM_SELECT} WHERE 1=1");
    if filters.category_id.is_some() {
        sql.push_str(" AND mi.category_id = ?");
    }
    if filters.available.is_some() {
        sql.push_str(" AND mi.is_available = ?");
    }
    if filters.search.is_some() {
        sql.push_str(" AND (mi.name LIKE ? OR mi.description LIKE ?)");
    }
    sql.push_str(" ORDER BY c.sort_order, mi.name");

    let mut query = sqlx::query_as::<_, MenuItemWithCategory>(&sql);
    if let Some(category_id) = filters.category_id {
        query = query.bind(category_id);
    }
    if let Some(available) = filters.available {
        query = query.bind(available);
    }
    if let Some(search) = &filters.search {
        let pattern = format!("%{search}%");
        query = query.bind(pattern.clone()).bind(pattern);
    }

    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MenuItemWithCategory>> {
    let sql = format!("{MENU_ITEM_SELECT} WHERE mi.id = ?");
    let row = sqlx::query_as::<_, MenuItemWithCategory>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

async fn ensure_category_exists(pool: &SqlitePool, category_id: i64) -> RepoResult<()> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM category WHERE id = ?")
        .bind(category_id)
        .fetch_optional(pool)
        .await?;
    if existing.is_none() {
        return Err(RepoError::Validation(format!(
            "Category {category_id} does not exist"
        )));
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, data: MenuItemCreate) -> RepoResult<MenuItemWithCategory> {
    ensure_category_exists(pool, data.category_id).await?;

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO menu_item (id, category_id, name, description, price, cost_price, image, is_available, is_featured, preparation_time, spicy_level, calories, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(data.category_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.cost_price.unwrap_or(0.0))
    .bind(&data.image)
    .bind(data.is_available.unwrap_or(true))
    .bind(data.is_featured.unwrap_or(false))
    .bind(data.preparation_time)
    .bind(data.spicy_level.unwrap_or(0))
    .bind(data.calories)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create menu item".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: MenuItemUpdate,
) -> RepoResult<MenuItemWithCategory> {
    if let Some(category_id) = data.category_id {
        ensure_category_exists(pool, category_id).await?;
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE menu_item SET category_id = COALESCE(?1, category_id), name = COALESCE(?2, name), description = COALESCE(?3, description), price = COALESCE(?4, price), cost_price = COALESCE(?5, cost_price), image = COALESCE(?6, image), is_available = COALESCE(?7, is_available), is_featured = COALESCE(?8, is_featured), preparation_time = COALESCE(?9, preparation_time), spicy_level = COALESCE(?10, spicy_level), calories = COALESCE(?11, calories), updated_at = ?12 WHERE id = ?13",
    )
    .bind(data.category_id)
    .bind(&data.name)
    .bind(&data.description)
    .bind(data.price)
    .bind(data.cost_price)
    .bind(&data.image)
    .bind(data.is_available)
    .bind(data.is_featured)
    .bind(data.preparation_time)
    .bind(data.spicy_level)
    .bind(data.calories)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Menu item {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Menu item {id} not found")))
}

/// Hard delete, guarded: an item referenced by any order line stays
/// (price history would break); toggle `is_available` instead.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let ref_count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM order_item WHERE menu_item_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if ref_count > 0 {
        return Err(RepoError::Conflict(
            "Menu item appears in existing orders; mark it unavailable instead".into(),
        ));
    }

    let rows = sqlx::query("DELETE FROM menu_item WHERE id = ?")
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
    async fn filters_combine() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;

        let all = find_all(&pool, MenuItemFilters::default()).await.expect("all");
        assert_eq!(all.len(), 2);

        let by_search = find_all(
            &pool,
            MenuItemFilters {
                search: Some("nasi".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("search");
        assert_eq!(by_search.len(), 1);
        assert_eq!(by_search[0].id, fx.nasi_lemak_id);

        let by_category = find_all(
            &pool,
            MenuItemFilters {
                category_id: Some(fx.category_id),
                available: Some(true),
                ..Default::default()
            },
        )
        .await
        .expect("category");
        assert_eq!(by_category.len(), 2);
        assert_eq!(by_category[0].category_name, "Mains");
    }

    #[tokio::test]
    async fn create_requires_existing_category() {
        let pool = test_pool().await;
        testing::seed(&pool).await;

        let err = create(
            &pool,
            MenuItemCreate {
                category_id: 999,
                name: "Ghost dish".to_string(),
                description: None,
                price: 100.0,
                cost_price: None,
                image: None,
                is_available: None,
                is_featured: None,
                preparation_time: None,
                spicy_level: None,
                calories: None,
            },
        )
        .await
        .expect_err("missing category");
        assert!(matches!(err, RepoError::Validation(_)));
    }
}
