//! Dining Table Repository

use super::{RepoError, RepoResult};
use shared::models::{DiningTable, DiningTableCreate, DiningTableUpdate, Order, TableStatus};
use sqlx::SqlitePool;

const TABLE_SELECT: &str = "SELECT id, table_number, capacity, location, status, qr_code, created_at, updated_at FROM dining_table";

const ORDER_SELECT: &str = "SELECT id, order_number, table_id, user_id, customer_name, customer_phone, order_type, status, subtotal, tax, service_charge, discount, total, notes, created_at, updated_at, completed_at FROM orders";

pub async fn find_all(
    pool: &SqlitePool,
    status: Option<TableStatus>,
) -> RepoResult<Vec<DiningTable>> {
    let mut sql = format!("{TABLE_SELECT}");
    if status.is_some() {
        sql.push_str(" WHERE status = ?");
    }
    sql.push_str(" ORDER BY table_number");

    let mut query = sqlx::query_as::<_, DiningTable>(&sql);
    if let Some(status) = status {
        query = query.bind(status.as_str());
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DiningTable>> {
    let sql = format!("{TABLE_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, DiningTable>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// The active (non-terminal) order seated at this table, if any.
pub async fn active_order(pool: &SqlitePool, table_id: i64) -> RepoResult<Option<Order>> {
    let sql = format!(
        "{ORDER_SELECT} WHERE table_id = ? AND status NOT IN ('completed', 'cancelled') ORDER BY created_at DESC LIMIT 1"
    );
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(table_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: DiningTableCreate) -> RepoResult<DiningTable> {
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM dining_table WHERE table_number = ?")
            .bind(&data.table_number)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Table {} already exists",
            data.table_number
        )));
    }

    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO dining_table (id, table_number, capacity, location, status, qr_code, created_at, updated_at) VALUES (?, ?, ?, ?, 'available', ?, ?, ?)",
    )
    .bind(id)
    .bind(&data.table_number)
    .bind(data.capacity.unwrap_or(4))
    .bind(&data.location)
    .bind(&data.qr_code)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create dining table".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: DiningTableUpdate,
) -> RepoResult<DiningTable> {
    if let Some(table_number) = &data.table_number {
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM dining_table WHERE table_number = ? AND id != ?")
                .bind(table_number)
                .bind(id)
                .fetch_optional(pool)
                .await?;
        if existing.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Table {table_number} already exists"
            )));
        }
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE dining_table SET table_number = COALESCE(?1, table_number), capacity = COALESCE(?2, capacity), location = COALESCE(?3, location), qr_code = COALESCE(?4, qr_code), updated_at = ?5 WHERE id = ?6",
    )
    .bind(&data.table_number)
    .bind(data.capacity)
    .bind(&data.location)
    .bind(&data.qr_code)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Table {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Table {id} not found")))
}

/// Manual status change (reserve, maintenance, back to available).
///
/// `occupied` is owned by the order lifecycle and cannot be set by hand;
/// a table with an active order cannot be released manually either.
pub async fn set_status(
    pool: &SqlitePool,
    id: i64,
    status: TableStatus,
) -> RepoResult<DiningTable> {
    if status == TableStatus::Occupied {
        return Err(RepoError::Validation(
            "Table occupancy is managed by orders and cannot be set manually".into(),
        ));
    }
    if active_order(pool, id).await?.is_some() {
        return Err(RepoError::Conflict(
            "Table has an active order; settle or cancel it first".into(),
        ));
    }

    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE dining_table SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Table {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Table {id} not found")))
}

/// Hard delete, guarded: a table referenced by any order is kept.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let order_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE table_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if order_count > 0 {
        return Err(RepoError::Conflict(
            "Table has order history and cannot be deleted".into(),
        ));
    }

    let rows = sqlx::query("DELETE FROM dining_table WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// (occupied, total) counts for the dashboard.
pub async fn occupancy(pool: &SqlitePool) -> RepoResult<(i64, i64)> {
    let occupied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM dining_table WHERE status = 'occupied'")
            .fetch_one(pool)
            .await?;
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dining_table")
        .fetch_one(pool)
        .await?;
    Ok((occupied, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;
    use crate::db::test_pool;

    #[tokio::test]
    async fn manual_status_rules() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;

        let reserved = set_status(&pool, fx.table_id, TableStatus::Reserved)
            .await
            .expect("reserve");
        assert_eq!(reserved.status, TableStatus::Reserved);

        let err = set_status(&pool, fx.table_id, TableStatus::Occupied)
            .await
            .expect_err("occupied is order-managed");
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_table_number_rejected() {
        let pool = test_pool().await;
        testing::seed(&pool).await;

        let err = create(
            &pool,
            DiningTableCreate {
                table_number: "T1".to_string(),
                capacity: None,
                location: None,
                qr_code: None,
            },
        )
        .await
        .expect_err("duplicate");
        assert!(matches!(err, RepoError::Duplicate(_)));
    }
}
