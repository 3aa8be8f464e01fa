//! Payment Repository
//!
//! One payment per order, enforced by a UNIQUE constraint on order_id.
//! Processing a payment completes the order and frees its table in the
//! same transaction.

use super::{RepoError, RepoResult, is_unique_violation};
use serde::Serialize;
use shared::models::{OrderStatus, OrderType, Payment, PaymentCreate, PaymentMethod};
use shared::util::{now_millis, round2, snowflake_id};
use sqlx::{Sqlite, SqlitePool, Transaction};

const PAYMENT_SELECT: &str = "SELECT id, payment_number, order_id, amount, payment_method, payment_status, transaction_id, paid_at FROM payment";

/// Cash tolerance for amount matching
const AMOUNT_EPSILON: f64 = 0.01;

const MAX_NUMBER_RETRIES: usize = 3;

/// Payment row joined with its order for history views
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PaymentHistoryRow {
    pub id: i64,
    pub payment_number: String,
    pub order_id: i64,
    pub order_number: String,
    pub order_total: f64,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub payment_status: String,
    pub transaction_id: Option<String>,
    pub paid_at: i64,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Payment>> {
    let sql = format!("{PAYMENT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Payment>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Option<Payment>> {
    let sql = format!("{PAYMENT_SELECT} WHERE order_id = ?");
    let row = sqlx::query_as::<_, Payment>(&sql)
        .bind(order_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn history(
    pool: &SqlitePool,
    start_ms: Option<i64>,
    end_ms: Option<i64>,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<PaymentHistoryRow>> {
    let mut sql = String::from(
        "SELECT p.id, p.payment_number, p.order_id, o.order_number, o.total as order_total, p.amount, p.payment_method, p.payment_status, p.transaction_id, p.paid_at FROM payment p JOIN orders o ON p.order_id = o.id WHERE 1=1",
    );
    if start_ms.is_some() {
        sql.push_str(" AND p.paid_at >= ?");
    }
    if end_ms.is_some() {
        sql.push_str(" AND p.paid_at < ?");
    }
    sql.push_str(" ORDER BY p.paid_at DESC LIMIT ? OFFSET ?");

    let mut query = sqlx::query_as::<_, PaymentHistoryRow>(&sql);
    if let Some(start) = start_ms {
        query = query.bind(start);
    }
    if let Some(end) = end_ms {
        query = query.bind(end);
    }
    let limit = if limit > 0 { limit } else { 50 };
    let rows = query.bind(limit).bind(offset.max(0)).fetch_all(pool).await?;
    Ok(rows)
}

async fn next_payment_number(
    tx: &mut Transaction<'_, Sqlite>,
    attempt: usize,
) -> RepoResult<String> {
    let date = chrono::Utc::now().format("%Y%m%d").to_string();
    let prefix = format!("PAY-{date}-%");
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payment WHERE payment_number LIKE ?")
        .bind(&prefix)
        .fetch_one(&mut **tx)
        .await?;
    Ok(format!("PAY-{date}-{:04}", count + 1 + attempt as i64))
}

/// Process a payment for an order.
///
/// The order must be in `pending` or `ready` status, unpaid, and the
/// tendered amount must match the order total (within one cent). On
/// success the order is marked completed and a dine-in table is released.
pub async fn process(pool: &SqlitePool, data: PaymentCreate) -> RepoResult<Payment> {
    if !data.amount.is_finite() || data.amount <= 0.0 {
        return Err(RepoError::Validation("Payment amount must be positive".into()));
    }

    let mut tx = pool.begin().await?;

    #[derive(sqlx::FromRow)]
    struct OrderRow {
        status: OrderStatus,
        order_type: OrderType,
        table_id: Option<i64>,
        total: f64,
    }

    let order = sqlx::query_as::<_, OrderRow>(
        "SELECT status, order_type, table_id, total FROM orders WHERE id = ?",
    )
    .bind(data.order_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", data.order_id)))?;

    match order.status {
        OrderStatus::Pending | OrderStatus::Ready => {}
        OrderStatus::Completed => {
            return Err(RepoError::Conflict("Order is already paid".into()));
        }
        OrderStatus::Cancelled => {
            return Err(RepoError::Validation("Cannot pay a cancelled order".into()));
        }
        OrderStatus::Preparing => {
            return Err(RepoError::Validation(
                "Order is still being prepared".into(),
            ));
        }
    }

    let paid: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payment WHERE order_id = ?")
        .bind(data.order_id)
        .fetch_one(&mut *tx)
        .await?;
    if paid > 0 {
        return Err(RepoError::Conflict("Order is already paid".into()));
    }

    let amount = round2(data.amount);
    if (amount - order.total).abs() > AMOUNT_EPSILON {
        return Err(RepoError::Validation(format!(
            "Payment amount {:.2} does not match order total {:.2}",
            amount, order.total
        )));
    }

    let payment_id = snowflake_id();
    let now = now_millis();

    let mut inserted = false;
    for attempt in 0..MAX_NUMBER_RETRIES {
        let payment_number = next_payment_number(&mut tx, attempt).await?;
        let result = sqlx::query(
            "INSERT INTO payment (id, payment_number, order_id, amount, payment_method, payment_status, transaction_id, paid_at) VALUES (?, ?, ?, ?, ?, 'completed', ?, ?)",
        )
        .bind(payment_id)
        .bind(&payment_number)
        .bind(data.order_id)
        .bind(amount)
        .bind(data.payment_method.as_str())
        .bind(&data.transaction_id)
        .bind(now)
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => {
                inserted = true;
                break;
            }
            Err(e) if is_unique_violation(&e, "payment.payment_number") => continue,
            Err(e) if is_unique_violation(&e, "payment.order_id") => {
                return Err(RepoError::Conflict("Order is already paid".into()));
            }
            Err(e) => return Err(e.into()),
        }
    }
    if !inserted {
        return Err(RepoError::Database(
            "Could not allocate a unique payment number".into(),
        ));
    }

    sqlx::query(
        "UPDATE orders SET status = 'completed', completed_at = ?, updated_at = ? WHERE id = ?",
    )
    .bind(now)
    .bind(now)
    .bind(data.order_id)
    .execute(&mut *tx)
    .await?;

    if order.order_type == OrderType::DineIn
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

    find_by_id(pool, payment_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to record payment".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{order, testing};
    use crate::db::test_pool;
    use shared::models::{OrderCreate, OrderItemCreate, TableStatus};

    async fn seed_order(pool: &SqlitePool, fx: &testing::Fixture) -> order::OrderDetail {
        let payload = OrderCreate {
            table_id: Some(fx.table_id),
            customer_name: None,
            customer_phone: None,
            order_type: shared::models::OrderType::DineIn,
            items: vec![
                OrderItemCreate {
                    menu_item_id: fx.nasi_lemak_id,
                    quantity: 1,
                    notes: None,
                },
                OrderItemCreate {
                    menu_item_id: fx.teh_tarik_id,
                    quantity: 2,
                    notes: None,
                },
            ],
            discount: 0.0,
            notes: None,
        };
        order::create(pool, fx.waiter_id, payload, 0.10, 0.05)
            .await
            .expect("seed order")
    }

    #[tokio::test]
    async fn exact_payment_completes_order_and_frees_table() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;
        let detail = seed_order(&pool, &fx).await;

        let payment = process(
            &pool,
            PaymentCreate {
                order_id: detail.order.id,
                amount: 51750.0,
                payment_method: PaymentMethod::Cash,
                transaction_id: None,
            },
        )
        .await
        .expect("process payment");

        assert_eq!(payment.amount, 51750.0);
        assert_eq!(payment.payment_status, "completed");
        let date = chrono::Utc::now().format("%Y%m%d").to_string();
        assert_eq!(payment.payment_number, format!("PAY-{date}-0001"));

        let paid = order::find_by_id(&pool, detail.order.id)
            .await
            .expect("q")
            .expect("order");
        assert_eq!(paid.status, OrderStatus::Completed);
        assert!(paid.completed_at.is_some());

        let table = crate::db::repository::dining_table::find_by_id(&pool, fx.table_id)
            .await
            .expect("table")
            .expect("exists");
        assert_eq!(table.status, TableStatus::Available);
    }

    #[tokio::test]
    async fn amount_mismatch_rejected() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;
        let detail = seed_order(&pool, &fx).await;

        let err = process(
            &pool,
            PaymentCreate {
                order_id: detail.order.id,
                amount: 51749.0,
                payment_method: PaymentMethod::Cash,
                transaction_id: None,
            },
        )
        .await
        .expect_err("wrong amount");
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn second_payment_rejected() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;
        let detail = seed_order(&pool, &fx).await;

        let payload = PaymentCreate {
            order_id: detail.order.id,
            amount: 51750.0,
            payment_method: PaymentMethod::Card,
            transaction_id: Some("TXN-1".to_string()),
        };
        process(&pool, payload.clone()).await.expect("first payment");

        let err = process(&pool, payload).await.expect_err("already paid");
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn preparing_order_not_payable() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;
        let detail = seed_order(&pool, &fx).await;

        order::transition(&pool, detail.order.id, OrderStatus::Preparing)
            .await
            .expect("to preparing");

        let err = process(
            &pool,
            PaymentCreate {
                order_id: detail.order.id,
                amount: 51750.0,
                payment_method: PaymentMethod::QrCode,
                transaction_id: None,
            },
        )
        .await
        .expect_err("still preparing");
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn ready_order_is_payable() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;
        let detail = seed_order(&pool, &fx).await;

        order::transition(&pool, detail.order.id, OrderStatus::Preparing)
            .await
            .expect("preparing");
        order::transition(&pool, detail.order.id, OrderStatus::Ready)
            .await
            .expect("ready");

        let payment = process(
            &pool,
            PaymentCreate {
                order_id: detail.order.id,
                amount: 51750.0,
                payment_method: PaymentMethod::Transfer,
                transaction_id: Some("TRF-42".to_string()),
            },
        )
        .await
        .expect("pay ready order");
        assert_eq!(payment.transaction_id.as_deref(), Some("TRF-42"));
    }
}
