//! Order Repository
//!
//! Order creation is fully transactional: price snapshots, totals, the
//! order-number sequence and table occupancy are settled in one commit.

use super::{RepoError, RepoResult, is_unique_violation};
use serde::Serialize;
use shared::models::{ItemStatus, Order, OrderCreate, OrderStatus, OrderType};
use shared::util::{now_millis, round2, snowflake_id};
use sqlx::{Sqlite, SqlitePool, Transaction};

const ORDER_SELECT: &str = "SELECT id, order_number, table_id, user_id, customer_name, customer_phone, order_type, status, subtotal, tax, service_charge, discount, total, notes, created_at, updated_at, completed_at FROM orders";

const MAX_NUMBER_RETRIES: usize = 3;

/// Order row for list views (joined with table and waiter)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderListRow {
    pub id: i64,
    pub order_number: String,
    pub table_id: Option<i64>,
    pub table_number: Option<String>,
    pub waiter_name: Option<String>,
    pub customer_name: Option<String>,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub subtotal: f64,
    pub tax: f64,
    pub service_charge: f64,
    pub discount: f64,
    pub total: f64,
    pub items_count: i64,
    pub notes: Option<String>,
    pub created_at: i64,
    pub completed_at: Option<i64>,
}

/// Order line joined with menu item info
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItemDetail {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub menu_item_name: String,
    pub image: Option<String>,
    pub quantity: i32,
    pub price: f64,
    pub subtotal: f64,
    pub status: ItemStatus,
    pub notes: Option<String>,
    pub prepared_at: Option<i64>,
}

/// Full order with its lines
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
}

/// List filters; all optional and combined with AND.
#[derive(Debug, Default, Clone)]
pub struct OrderFilters {
    pub status: Option<OrderStatus>,
    pub table_id: Option<i64>,
    pub start_ms: Option<i64>,
    pub end_ms: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn items_of(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItemDetail>> {
    let rows = sqlx::query_as::<_, OrderItemDetail>(
        "SELECT oi.id, oi.order_id, oi.menu_item_id, mi.name as menu_item_name, mi.image, oi.quantity, oi.price, oi.subtotal, oi.status, oi.notes, oi.prepared_at FROM order_item oi JOIN menu_item mi ON oi.menu_item_id = mi.id WHERE oi.order_id = ? ORDER BY oi.id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<OrderDetail>> {
    let order = match find_by_id(pool, id).await? {
        Some(order) => order,
        None => return Ok(None),
    };
    let items = items_of(pool, id).await?;
    Ok(Some(OrderDetail { order, items }))
}

pub async fn find_all(pool: &SqlitePool, filters: OrderFilters) -> RepoResult<Vec<OrderListRow>> {
    let mut sql = String::from(
        "SELECT o.id, o.order_number, o.table_id, dt.table_number, u.full_name as waiter_name, o.customer_name, o.order_type, o.status, o.subtotal, o.tax, o.service_charge, o.discount, o.total, (SELECT COUNT(*) FROM order_item oi WHERE oi.order_id = o.id) as items_count, o.notes, o.created_at, o.completed_at FROM orders o LEFT JOIN dining_table dt ON o.table_id = dt.id LEFT JOIN user u ON o.user_id = u.id WHERE 1=1",
    );
    if filters.status.is_some() {
        sql.push_str(" AND o.status = ?");
    }
    if filters.table_id.is_some() {
        sql.push_str(" AND o.table_id = ?");
    }
    if filters.start_ms.is_some() {
        sql.push_str(" AND o.created_at >= ?");
    }
    if filters.end_ms.is_some() {
        sql.push_str(" AND o.created_at < ?");
    }
    sql.push_str(" ORDER BY o.created_at DESC LIMIT ? OFFSET ?");

    let mut query = sqlx::query_as::<_, OrderListRow>(&sql);
    if let Some(status) = filters.status {
        query = query.bind(status.as_str());
    }
    if let Some(table_id) = filters.table_id {
        query = query.bind(table_id);
    }
    if let Some(start) = filters.start_ms {
        query = query.bind(start);
    }
    if let Some(end) = filters.end_ms {
        query = query.bind(end);
    }
    let limit = if filters.limit > 0 { filters.limit } else { 50 };
    query = query.bind(limit).bind(filters.offset.max(0));

    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

/// Next order number for today: `ORD-YYYYMMDD-NNNN`.
///
/// Sequence is per calendar day, derived from a prefix count inside the
/// creating transaction; the UNIQUE constraint plus retry closes the race.
async fn next_order_number(tx: &mut Transaction<'_, Sqlite>, attempt: usize) -> RepoResult<String> {
    let date = chrono::Utc::now().format("%Y%m%d").to_string();
    let prefix = format!("ORD-{date}-%");
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE order_number LIKE ?")
        .bind(&prefix)
        .fetch_one(&mut **tx)
        .await?;
    Ok(format!("ORD-{date}-{:04}", count + 1 + attempt as i64))
}

/// Create an order with server-side pricing.
///
/// Client payloads carry only menu item IDs and quantities; unit prices
/// are read from the menu inside the transaction. For dine-in orders with
/// a table, the occupancy check and the flip to `occupied` happen in the
/// same transaction as the insert.
pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    data: OrderCreate,
    tax_rate: f64,
    service_rate: f64,
) -> RepoResult<OrderDetail> {
    if data.items.is_empty() {
        return Err(RepoError::Validation("Order must contain at least one item".into()));
    }
    for item in &data.items {
        if item.quantity <= 0 {
            return Err(RepoError::Validation(format!(
                "Quantity for menu item {} must be positive",
                item.menu_item_id
            )));
        }
    }
    if data.discount < 0.0 || !data.discount.is_finite() {
        return Err(RepoError::Validation("Discount cannot be negative".into()));
    }

    let mut tx = pool.begin().await?;

    // Price snapshots from the menu, not the client
    #[derive(sqlx::FromRow)]
    struct PriceRow {
        name: String,
        price: f64,
        is_available: bool,
    }

    let mut lines: Vec<(i64, i32, f64, Option<String>)> = Vec::with_capacity(data.items.len());
    let mut subtotal = 0.0_f64;
    for item in &data.items {
        let row = sqlx::query_as::<_, PriceRow>(
            "SELECT name, price, is_available FROM menu_item WHERE id = ?",
        )
        .bind(item.menu_item_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            RepoError::Validation(format!("Menu item {} does not exist", item.menu_item_id))
        })?;
        if !row.is_available {
            return Err(RepoError::Validation(format!(
                "{} is currently unavailable",
                row.name
            )));
        }
        let line_subtotal = round2(row.price * item.quantity as f64);
        subtotal += line_subtotal;
        lines.push((item.menu_item_id, item.quantity, row.price, item.notes.clone()));
    }
    let subtotal = round2(subtotal);

    let tax = round2(subtotal * tax_rate);
    let service_charge = if data.order_type == OrderType::DineIn {
        round2(subtotal * service_rate)
    } else {
        0.0
    };
    let discount = round2(data.discount);
    let total = round2(subtotal + tax + service_charge - discount);
    if total < 0.0 {
        return Err(RepoError::Validation(
            "Discount exceeds the order amount".into(),
        ));
    }

    // Occupancy: dine-in with a table claims it atomically
    if data.order_type == OrderType::DineIn
        && let Some(table_id) = data.table_id
    {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM dining_table WHERE id = ?")
                .bind(table_id)
                .fetch_optional(&mut *tx)
                .await?;
        let status = status
            .ok_or_else(|| RepoError::NotFound(format!("Table {table_id} not found")))?;
        if status != "available" {
            return Err(RepoError::Conflict(format!(
                "Table is not available (current status: {status})"
            )));
        }
        let active: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE table_id = ? AND status NOT IN ('completed', 'cancelled')",
        )
        .bind(table_id)
        .fetch_one(&mut *tx)
        .await?;
        if active > 0 {
            return Err(RepoError::Conflict(
                "Table already has an active order".into(),
            ));
        }
        sqlx::query("UPDATE dining_table SET status = 'occupied', updated_at = ? WHERE id = ?")
            .bind(now_millis())
            .bind(table_id)
            .execute(&mut *tx)
            .await?;
    }

    let now = now_millis();
    let order_id = snowflake_id();
    let table_id = if data.order_type == OrderType::DineIn {
        data.table_id
    } else {
        None
    };

    let mut inserted = false;
    for attempt in 0..MAX_NUMBER_RETRIES {
        let order_number = next_order_number(&mut tx, attempt).await?;
        let result = sqlx::query(
            "INSERT INTO orders (id, order_number, table_id, user_id, customer_name, customer_phone, order_type, status, subtotal, tax, service_charge, discount, total, notes, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(&order_number)
        .bind(table_id)
        .bind(user_id)
        .bind(&data.customer_name)
        .bind(&data.customer_phone)
        .bind(data.order_type.as_str())
        .bind(subtotal)
        .bind(tax)
        .bind(service_charge)
        .bind(discount)
        .bind(total)
        .bind(&data.notes)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {
                inserted = true;
                break;
            }
            Err(e) if is_unique_violation(&e, "orders.order_number") => continue,
            Err(e) => return Err(e.into()),
        }
    }
    if !inserted {
        return Err(RepoError::Database(
            "Could not allocate a unique order number".into(),
        ));
    }

    for (menu_item_id, quantity, price, notes) in &lines {
        sqlx::query(
            "INSERT INTO order_item (id, order_id, menu_item_id, quantity, price, subtotal, status, notes) VALUES (?, ?, ?, ?, ?, ?, 'pending', ?)",
        )
        .bind(snowflake_id())
        .bind(order_id)
        .bind(menu_item_id)
        .bind(quantity)
        .bind(price)
        .bind(round2(price * *quantity as f64))
        .bind(notes)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    find_detail(pool, order_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))
}

/// Move an order along the status machine.
///
/// Legality is checked against the current status inside a transaction;
/// completing or cancelling a dine-in order frees its table. Items are
/// synced forward on kitchen transitions.
pub async fn transition(pool: &SqlitePool, id: i64, next: OrderStatus) -> RepoResult<Order> {
    let mut tx = pool.begin().await?;

    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))?;

    if !order.status.can_transition(next) {
        return Err(RepoError::Conflict(format!(
            "Cannot change order status from {} to {}",
            order.status.as_str(),
            next.as_str()
        )));
    }

    let now = now_millis();
    let completed_at = if next == OrderStatus::Completed {
        Some(now)
    } else {
        None
    };
    sqlx::query("UPDATE orders SET status = ?, updated_at = ?, completed_at = COALESCE(?, completed_at) WHERE id = ?")
        .bind(next.as_str())
        .bind(now)
        .bind(completed_at)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    // Keep item statuses in step with kitchen transitions
    match next {
        OrderStatus::Preparing => {
            sqlx::query(
                "UPDATE order_item SET status = 'preparing' WHERE order_id = ? AND status = 'pending'",
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }
        OrderStatus::Ready => {
            sqlx::query(
                "UPDATE order_item SET status = 'ready', prepared_at = COALESCE(prepared_at, ?) WHERE order_id = ? AND status != 'ready'",
            )
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        }
        _ => {}
    }

    // Terminal states release the table
    if next.is_terminal()
        && order.order_type == OrderType::DineIn
        && let Some(table_id) = order.table_id
    {
        sqlx::query(
            "UPDATE dining_table SET status = 'available', updated_at = ? WHERE id = ? AND status = 'occupied'",
        )
        .bind(now)
        .bind(table_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}

/// Replace order notes (active orders only).
pub async fn update_notes(pool: &SqlitePool, id: i64, notes: Option<&str>) -> RepoResult<Order> {
    let now = now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET notes = ?, updated_at = ? WHERE id = ? AND status NOT IN ('completed', 'cancelled')",
    )
    .bind(notes)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Order {id} not found or already closed"
        )));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}

/// Advance one line item (kitchen workflow), forward-only.
///
/// First item moving to `preparing` pulls a pending order along; when the
/// last item reaches `ready` the order is promoted to `ready`.
pub async fn advance_item(
    pool: &SqlitePool,
    item_id: i64,
    next: ItemStatus,
) -> RepoResult<OrderItemDetail> {
    let mut tx = pool.begin().await?;

    #[derive(sqlx::FromRow)]
    struct ItemRow {
        order_id: i64,
        status: ItemStatus,
        order_status: OrderStatus,
    }

    let item = sqlx::query_as::<_, ItemRow>(
        "SELECT oi.order_id, oi.status, o.status as order_status FROM order_item oi JOIN orders o ON oi.order_id = o.id WHERE oi.id = ?",
    )
    .bind(item_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Order item {item_id} not found")))?;

    if item.order_status.is_terminal() {
        return Err(RepoError::Conflict(format!(
            "Order is already {}",
            item.order_status.as_str()
        )));
    }
    if !item.status.can_transition(next) {
        return Err(RepoError::Conflict(format!(
            "Cannot change item status from {} to {}",
            item.status.as_str(),
            next.as_str()
        )));
    }

    let now = now_millis();
    let prepared_at = if next == ItemStatus::Ready { Some(now) } else { None };
    sqlx::query("UPDATE order_item SET status = ?, prepared_at = COALESCE(?, prepared_at) WHERE id = ?")
        .bind(next.as_str())
        .bind(prepared_at)
        .bind(item_id)
        .execute(&mut *tx)
        .await?;

    match next {
        ItemStatus::Preparing if item.order_status == OrderStatus::Pending => {
            sqlx::query("UPDATE orders SET status = 'preparing', updated_at = ? WHERE id = ?")
                .bind(now)
                .bind(item.order_id)
                .execute(&mut *tx)
                .await?;
        }
        ItemStatus::Ready => {
            let unready: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM order_item WHERE order_id = ? AND status != 'ready'",
            )
            .bind(item.order_id)
            .fetch_one(&mut *tx)
            .await?;
            if unready == 0 {
                sqlx::query("UPDATE orders SET status = 'ready', updated_at = ? WHERE id = ?")
                    .bind(now)
                    .bind(item.order_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }
        _ => {}
    }

    tx.commit().await?;

    let row = sqlx::query_as::<_, OrderItemDetail>(
        "SELECT oi.id, oi.order_id, oi.menu_item_id, mi.name as menu_item_name, mi.image, oi.quantity, oi.price, oi.subtotal, oi.status, oi.notes, oi.prepared_at FROM order_item oi JOIN menu_item mi ON oi.menu_item_id = mi.id WHERE oi.id = ?",
    )
    .bind(item_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Order item {item_id} not found")))?;
    Ok(row)
}

/// Kitchen queue entry: an active order with its elapsed time.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct KitchenOrderRow {
    pub id: i64,
    pub order_number: String,
    pub table_number: Option<String>,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: i64,
    pub pending_items: i64,
    pub preparing_items: i64,
    pub total_items: i64,
}

/// Item-level queue row for the kitchen display
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct KitchenQueueItem {
    pub id: i64,
    pub order_id: i64,
    pub order_number: String,
    pub table_number: Option<String>,
    pub menu_item_name: String,
    pub preparation_time: Option<i32>,
    pub quantity: i32,
    pub status: ItemStatus,
    pub notes: Option<String>,
    pub order_created_at: i64,
}

/// Kitchen workload counters
#[derive(Debug, Clone, Serialize)]
pub struct KitchenStats {
    pub pending_orders: i64,
    pub preparing_orders: i64,
    pub ready_orders: i64,
    pub late_orders: i64,
    pub items_in_queue: i64,
}

/// Orders are considered late after half an hour in the kitchen.
const LATE_THRESHOLD_MS: i64 = 30 * 60 * 1000;

/// Active orders for the kitchen display, oldest first.
pub async fn kitchen_queue(pool: &SqlitePool) -> RepoResult<Vec<KitchenOrderRow>> {
    let rows = sqlx::query_as::<_, KitchenOrderRow>(
        "SELECT o.id, o.order_number, dt.table_number, o.order_type, o.status, o.notes, o.created_at, \
         (SELECT COUNT(*) FROM order_item oi WHERE oi.order_id = o.id AND oi.status = 'pending') as pending_items, \
         (SELECT COUNT(*) FROM order_item oi WHERE oi.order_id = o.id AND oi.status = 'preparing') as preparing_items, \
         (SELECT COUNT(*) FROM order_item oi WHERE oi.order_id = o.id) as total_items \
         FROM orders o LEFT JOIN dining_table dt ON o.table_id = dt.id \
         WHERE o.status IN ('pending', 'preparing') ORDER BY o.created_at ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Pending/preparing items of active orders, oldest order first.
pub async fn kitchen_item_queue(
    pool: &SqlitePool,
    status: Option<ItemStatus>,
) -> RepoResult<Vec<KitchenQueueItem>> {
    let mut sql = String::from(
        "SELECT oi.id, oi.order_id, o.order_number, dt.table_number, mi.name as menu_item_name, \
         mi.preparation_time, oi.quantity, oi.status, oi.notes, o.created_at as order_created_at \
         FROM order_item oi \
         JOIN orders o ON oi.order_id = o.id \
         JOIN menu_item mi ON oi.menu_item_id = mi.id \
         LEFT JOIN dining_table dt ON o.table_id = dt.id \
         WHERE o.status IN ('pending', 'preparing')",
    );
    if status.is_some() {
        sql.push_str(" AND oi.status = ?");
    } else {
        sql.push_str(" AND oi.status IN ('pending', 'preparing')");
    }
    sql.push_str(" ORDER BY o.created_at ASC, oi.id ASC");

    let mut query = sqlx::query_as::<_, KitchenQueueItem>(&sql);
    if let Some(status) = status {
        query = query.bind(status.as_str());
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

pub async fn kitchen_stats(pool: &SqlitePool) -> RepoResult<KitchenStats> {
    #[derive(sqlx::FromRow)]
    struct Row {
        pending_orders: i64,
        preparing_orders: i64,
        ready_orders: i64,
        late_orders: i64,
        items_in_queue: i64,
    }

    let cutoff = now_millis() - LATE_THRESHOLD_MS;
    let row = sqlx::query_as::<_, Row>(
        "SELECT \
         COUNT(CASE WHEN status = 'pending' THEN 1 END) as pending_orders, \
         COUNT(CASE WHEN status = 'preparing' THEN 1 END) as preparing_orders, \
         COUNT(CASE WHEN status = 'ready' THEN 1 END) as ready_orders, \
         COUNT(CASE WHEN status IN ('pending', 'preparing') AND created_at < ? THEN 1 END) as late_orders, \
         (SELECT COUNT(*) FROM order_item oi JOIN orders o2 ON oi.order_id = o2.id WHERE o2.status IN ('pending', 'preparing') AND oi.status != 'ready') as items_in_queue \
         FROM orders",
    )
    .bind(cutoff)
    .fetch_one(pool)
    .await?;

    Ok(KitchenStats {
        pending_orders: row.pending_orders,
        preparing_orders: row.preparing_orders,
        ready_orders: row.ready_orders,
        late_orders: row.late_orders,
        items_in_queue: row.items_in_queue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::testing;
    use crate::db::test_pool;
    use shared::models::{OrderItemCreate, TableStatus};

    fn dine_in_payload(table_id: Option<i64>, fx: &testing::Fixture) -> OrderCreate {
        OrderCreate {
            table_id,
            customer_name: Some("Ahmad".to_string()),
            customer_phone: None,
            order_type: OrderType::DineIn,
            items: vec![
                OrderItemCreate {
                    menu_item_id: fx.nasi_lemak_id,
                    quantity: 1,
                    notes: Some("extra sambal".to_string()),
                },
                OrderItemCreate {
                    menu_item_id: fx.teh_tarik_id,
                    quantity: 2,
                    notes: None,
                },
            ],
            discount: 0.0,
            notes: None,
        }
    }

    #[tokio::test]
    async fn create_computes_totals_and_claims_table() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;

        // 35000 + 2x5000 = 45000; tax 10% = 4500; service 5% = 2250
        let detail = create(&pool, fx.waiter_id, dine_in_payload(Some(fx.table_id), &fx), 0.10, 0.05)
            .await
            .expect("create order");

        assert_eq!(detail.order.subtotal, 45000.0);
        assert_eq!(detail.order.tax, 4500.0);
        assert_eq!(detail.order.service_charge, 2250.0);
        assert_eq!(detail.order.total, 51750.0);
        assert_eq!(detail.order.status, OrderStatus::Pending);
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.items[0].price, 35000.0);

        let date = chrono::Utc::now().format("%Y%m%d").to_string();
        assert_eq!(detail.order.order_number, format!("ORD-{date}-0001"));

        let table = crate::db::repository::dining_table::find_by_id(&pool, fx.table_id)
            .await
            .expect("table")
            .expect("exists");
        assert_eq!(table.status, TableStatus::Occupied);
    }

    #[tokio::test]
    async fn occupied_table_rejects_second_order() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;

        create(&pool, fx.waiter_id, dine_in_payload(Some(fx.table_id), &fx), 0.10, 0.05)
            .await
            .expect("first order");

        let err = create(&pool, fx.waiter_id, dine_in_payload(Some(fx.table_id), &fx), 0.10, 0.05)
            .await
            .expect_err("table occupied");
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn takeaway_has_no_service_charge() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;

        let mut payload = dine_in_payload(None, &fx);
        payload.order_type = OrderType::Takeaway;

        let detail = create(&pool, fx.waiter_id, payload, 0.10, 0.05)
            .await
            .expect("create takeaway");
        assert_eq!(detail.order.service_charge, 0.0);
        assert_eq!(detail.order.total, 49500.0);
    }

    #[tokio::test]
    async fn empty_items_rejected() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;

        let mut payload = dine_in_payload(None, &fx);
        payload.items.clear();
        let err = create(&pool, fx.waiter_id, payload, 0.10, 0.05)
            .await
            .expect_err("empty order");
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn order_numbers_increment_per_day() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;

        let mut payload = dine_in_payload(None, &fx);
        payload.order_type = OrderType::Takeaway;
        let first = create(&pool, fx.waiter_id, payload.clone(), 0.10, 0.05)
            .await
            .expect("first");
        let second = create(&pool, fx.waiter_id, payload, 0.10, 0.05)
            .await
            .expect("second");

        assert!(first.order.order_number.ends_with("-0001"));
        assert!(second.order.order_number.ends_with("-0002"));
        assert_ne!(first.order.order_number, second.order.order_number);
    }

    #[tokio::test]
    async fn transitions_are_forward_only() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;

        let detail = create(&pool, fx.waiter_id, dine_in_payload(Some(fx.table_id), &fx), 0.10, 0.05)
            .await
            .expect("create");
        let id = detail.order.id;

        let order = transition(&pool, id, OrderStatus::Preparing).await.expect("to preparing");
        assert_eq!(order.status, OrderStatus::Preparing);

        let err = transition(&pool, id, OrderStatus::Pending).await.expect_err("backwards");
        assert!(matches!(err, RepoError::Conflict(_)));

        let err = transition(&pool, id, OrderStatus::Completed).await.expect_err("skip ready");
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn cancel_frees_table() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;

        let detail = create(&pool, fx.waiter_id, dine_in_payload(Some(fx.table_id), &fx), 0.10, 0.05)
            .await
            .expect("create");

        let order = transition(&pool, detail.order.id, OrderStatus::Cancelled)
            .await
            .expect("cancel");
        assert_eq!(order.status, OrderStatus::Cancelled);

        let table = crate::db::repository::dining_table::find_by_id(&pool, fx.table_id)
            .await
            .expect("table")
            .expect("exists");
        assert_eq!(table.status, TableStatus::Available);

        let err = transition(&pool, detail.order.id, OrderStatus::Cancelled)
            .await
            .expect_err("already terminal");
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn item_flow_promotes_order() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;

        let detail = create(&pool, fx.waiter_id, dine_in_payload(Some(fx.table_id), &fx), 0.10, 0.05)
            .await
            .expect("create");
        let order_id = detail.order.id;
        let first = detail.items[0].id;
        let second = detail.items[1].id;

        // first item starting pulls the order into preparing
        advance_item(&pool, first, ItemStatus::Preparing).await.expect("start first");
        let order = find_by_id(&pool, order_id).await.expect("q").expect("order");
        assert_eq!(order.status, OrderStatus::Preparing);

        advance_item(&pool, second, ItemStatus::Preparing).await.expect("start second");
        advance_item(&pool, first, ItemStatus::Ready).await.expect("finish first");

        // order not ready until every item is
        let order = find_by_id(&pool, order_id).await.expect("q").expect("order");
        assert_eq!(order.status, OrderStatus::Preparing);

        let item = advance_item(&pool, second, ItemStatus::Ready).await.expect("finish second");
        assert_eq!(item.status, ItemStatus::Ready);
        assert!(item.prepared_at.is_some());

        let order = find_by_id(&pool, order_id).await.expect("q").expect("order");
        assert_eq!(order.status, OrderStatus::Ready);
    }

    #[tokio::test]
    async fn kitchen_queue_tracks_active_orders() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;

        let detail = create(&pool, fx.waiter_id, dine_in_payload(Some(fx.table_id), &fx), 0.10, 0.05)
            .await
            .expect("create");

        let queue = kitchen_queue(&pool).await.expect("queue");
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].pending_items, 2);
        assert_eq!(queue[0].total_items, 2);

        let stats = kitchen_stats(&pool).await.expect("stats");
        assert_eq!(stats.pending_orders, 1);
        assert_eq!(stats.items_in_queue, 2);

        transition(&pool, detail.order.id, OrderStatus::Cancelled).await.expect("cancel");
        let queue = kitchen_queue(&pool).await.expect("queue");
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn item_queue_filters_by_status() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;

        let detail = create(&pool, fx.waiter_id, dine_in_payload(Some(fx.table_id), &fx), 0.10, 0.05)
            .await
            .expect("create");

        let items = kitchen_item_queue(&pool, None).await.expect("queue");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].order_number, detail.order.order_number);
        assert!(items.iter().all(|i| i.status == ItemStatus::Pending));

        advance_item(&pool, detail.items[0].id, ItemStatus::Preparing)
            .await
            .expect("advance");

        let preparing = kitchen_item_queue(&pool, Some(ItemStatus::Preparing))
            .await
            .expect("filtered");
        assert_eq!(preparing.len(), 1);
        assert_eq!(preparing[0].menu_item_name, detail.items[0].menu_item_name);
    }

    #[tokio::test]
    async fn notes_only_on_active_orders() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;

        let detail = create(&pool, fx.waiter_id, dine_in_payload(Some(fx.table_id), &fx), 0.10, 0.05)
            .await
            .expect("create");

        let order = update_notes(&pool, detail.order.id, Some("no peanuts"))
            .await
            .expect("notes");
        assert_eq!(order.notes.as_deref(), Some("no peanuts"));

        transition(&pool, detail.order.id, OrderStatus::Cancelled).await.expect("cancel");
        let err = update_notes(&pool, detail.order.id, Some("late edit"))
            .await
            .expect_err("closed order");
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
