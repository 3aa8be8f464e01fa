//! Report Repository
//!
//! Aggregation queries over a `[start_ms, end_ms)` window. Revenue
//! figures count non-cancelled orders; payment figures count recorded
//! payments only. Dates are grouped in UTC.

use super::RepoResult;
use serde::Serialize;
use shared::models::{OrderStatus, OrderType, PaymentMethod};
use shared::util::{now_millis, round2};
use sqlx::SqlitePool;

#[derive(Debug, Clone, Serialize)]
pub struct SalesSummary {
    pub total_transactions: i64,
    pub total_revenue: f64,
    pub average_transaction: f64,
    pub unique_customers: i64,
    pub previous_revenue: f64,
    pub revenue_change_pct: Option<f64>,
    pub payment_breakdown: Vec<PaymentBreakdownRow>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PaymentBreakdownRow {
    pub payment_method: PaymentMethod,
    pub transactions: i64,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SalesTrendRow {
    pub date: String,
    pub orders: i64,
    pub revenue: f64,
    pub average_order: f64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MenuPerformanceRow {
    pub menu_item_id: i64,
    pub name: String,
    pub category_name: String,
    pub orders: i64,
    pub quantity_sold: i64,
    pub revenue: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CategoryBreakdownRow {
    pub category_id: i64,
    pub category_name: String,
    pub orders: i64,
    pub items_sold: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TransactionRow {
    pub order_id: i64,
    pub order_number: String,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub customer_name: Option<String>,
    pub table_number: Option<String>,
    pub total: f64,
    pub payment_method: Option<PaymentMethod>,
    pub payment_number: Option<String>,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionPage {
    pub transactions: Vec<TransactionRow>,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub today_orders: i64,
    pub today_revenue: f64,
    pub active_orders: i64,
    pub occupied_tables: i64,
    pub total_tables: i64,
    pub today_payments_total: f64,
}

/// Summary with a previous-period comparison of equal length.
pub async fn summary(pool: &SqlitePool, start_ms: i64, end_ms: i64) -> RepoResult<SalesSummary> {
    #[derive(sqlx::FromRow)]
    struct Totals {
        total_transactions: i64,
        total_revenue: f64,
        unique_customers: i64,
    }

    let totals = sqlx::query_as::<_, Totals>(
        "SELECT COUNT(*) as total_transactions, COALESCE(SUM(total), 0.0) as total_revenue, COUNT(DISTINCT customer_name) as unique_customers FROM orders WHERE status != 'cancelled' AND created_at >= ? AND created_at < ?",
    )
    .bind(start_ms)
    .bind(end_ms)
    .fetch_one(pool)
    .await?;

    let window = end_ms - start_ms;
    let previous_revenue: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(total), 0.0) FROM orders WHERE status != 'cancelled' AND created_at >= ? AND created_at < ?",
    )
    .bind(start_ms - window)
    .bind(start_ms)
    .fetch_one(pool)
    .await?;

    let payment_breakdown = sqlx::query_as::<_, PaymentBreakdownRow>(
        "SELECT payment_method, COUNT(*) as transactions, COALESCE(SUM(amount), 0) as amount FROM payment WHERE paid_at >= ? AND paid_at < ? GROUP BY payment_method ORDER BY amount DESC",
    )
    .bind(start_ms)
    .bind(end_ms)
    .fetch_all(pool)
    .await?;

    let average_transaction = if totals.total_transactions > 0 {
        round2(totals.total_revenue / totals.total_transactions as f64)
    } else {
        0.0
    };
    let revenue_change_pct = if previous_revenue > 0.0 {
        Some(round2(
            (totals.total_revenue - previous_revenue) / previous_revenue * 100.0,
        ))
    } else {
        None
    };

    Ok(SalesSummary {
        total_transactions: totals.total_transactions,
        total_revenue: round2(totals.total_revenue),
        average_transaction,
        unique_customers: totals.unique_customers,
        previous_revenue: round2(previous_revenue),
        revenue_change_pct,
        payment_breakdown,
    })
}

pub async fn sales_trend(
    pool: &SqlitePool,
    start_ms: i64,
    end_ms: i64,
) -> RepoResult<Vec<SalesTrendRow>> {
    let rows = sqlx::query_as::<_, SalesTrendRow>(
        "SELECT strftime('%Y-%m-%d', created_at / 1000, 'unixepoch') as date, COUNT(*) as orders, ROUND(COALESCE(SUM(total), 0), 2) as revenue, ROUND(COALESCE(AVG(total), 0), 2) as average_order FROM orders WHERE status != 'cancelled' AND created_at >= ? AND created_at < ? GROUP BY date ORDER BY date",
    )
    .bind(start_ms)
    .bind(end_ms)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Top menu items by revenue. Profit subtracts the cost price snapshot
/// currently on the menu item.
pub async fn menu_performance(
    pool: &SqlitePool,
    start_ms: i64,
    end_ms: i64,
    limit: i64,
) -> RepoResult<Vec<MenuPerformanceRow>> {
    let limit = limit.clamp(1, 100);
    let rows = sqlx::query_as::<_, MenuPerformanceRow>(
        "SELECT mi.id as menu_item_id, mi.name, c.name as category_name, COUNT(DISTINCT oi.order_id) as orders, COALESCE(SUM(oi.quantity), 0) as quantity_sold, ROUND(COALESCE(SUM(oi.subtotal), 0), 2) as revenue, ROUND(COALESCE(SUM(oi.subtotal - mi.cost_price * oi.quantity), 0), 2) as profit FROM order_item oi JOIN orders o ON oi.order_id = o.id JOIN menu_item mi ON oi.menu_item_id = mi.id JOIN category c ON mi.category_id = c.id WHERE o.status != 'cancelled' AND o.created_at >= ? AND o.created_at < ? GROUP BY mi.id ORDER BY revenue DESC LIMIT ?",
    )
    .bind(start_ms)
    .bind(end_ms)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn category_breakdown(
    pool: &SqlitePool,
    start_ms: i64,
    end_ms: i64,
) -> RepoResult<Vec<CategoryBreakdownRow>> {
    let rows = sqlx::query_as::<_, CategoryBreakdownRow>(
        "SELECT c.id as category_id, c.name as category_name, COUNT(DISTINCT oi.order_id) as orders, COALESCE(SUM(oi.quantity), 0) as items_sold, ROUND(COALESCE(SUM(oi.subtotal), 0), 2) as revenue FROM order_item oi JOIN orders o ON oi.order_id = o.id JOIN menu_item mi ON oi.menu_item_id = mi.id JOIN category c ON mi.category_id = c.id WHERE o.status != 'cancelled' AND o.created_at >= ? AND o.created_at < ? GROUP BY c.id ORDER BY revenue DESC",
    )
    .bind(start_ms)
    .bind(end_ms)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

const TRANSACTION_SELECT: &str = "SELECT o.id as order_id, o.order_number, o.order_type, o.status, o.customer_name, dt.table_number, o.total, p.payment_method, p.payment_number, o.created_at FROM orders o LEFT JOIN dining_table dt ON o.table_id = dt.id LEFT JOIN payment p ON p.order_id = o.id WHERE o.created_at >= ? AND o.created_at < ? ORDER BY o.created_at DESC";

pub async fn transactions(
    pool: &SqlitePool,
    start_ms: i64,
    end_ms: i64,
    limit: i64,
    offset: i64,
) -> RepoResult<TransactionPage> {
    let limit = limit.clamp(1, 500);
    let offset = offset.max(0);

    // Fetch one extra row to know whether another page exists
    let sql = format!("{TRANSACTION_SELECT} LIMIT ? OFFSET ?");
    let mut rows = sqlx::query_as::<_, TransactionRow>(&sql)
        .bind(start_ms)
        .bind(end_ms)
        .bind(limit + 1)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let has_more = rows.len() as i64 > limit;
    rows.truncate(limit as usize);

    Ok(TransactionPage {
        transactions: rows,
        limit,
        offset,
        has_more,
    })
}

/// All orders in the window, oldest first, for CSV export.
pub async fn export_rows(
    pool: &SqlitePool,
    start_ms: i64,
    end_ms: i64,
) -> RepoResult<Vec<TransactionRow>> {
    let sql = TRANSACTION_SELECT.replace("ORDER BY o.created_at DESC", "ORDER BY o.created_at ASC");
    let rows = sqlx::query_as::<_, TransactionRow>(&sql)
        .bind(start_ms)
        .bind(end_ms)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn dashboard_stats(pool: &SqlitePool) -> RepoResult<DashboardStats> {
    let now = now_millis();
    let day_start = now - now % (24 * 60 * 60 * 1000);

    #[derive(sqlx::FromRow)]
    struct OrderStats {
        today_orders: i64,
        today_revenue: f64,
        active_orders: i64,
    }

    let orders = sqlx::query_as::<_, OrderStats>(
        "SELECT COUNT(CASE WHEN created_at >= ? AND status != 'cancelled' THEN 1 END) as today_orders, COALESCE(SUM(CASE WHEN created_at >= ? AND status != 'cancelled' THEN total END), 0.0) as today_revenue, COUNT(CASE WHEN status IN ('pending', 'preparing', 'ready') THEN 1 END) as active_orders FROM orders",
    )
    .bind(day_start)
    .bind(day_start)
    .fetch_one(pool)
    .await?;

    let (occupied_tables, total_tables) = super::dining_table::occupancy(pool).await?;

    let today_payments_total: f64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0.0) FROM payment WHERE paid_at >= ?",
    )
    .bind(day_start)
    .fetch_one(pool)
    .await?;

    Ok(DashboardStats {
        today_orders: orders.today_orders,
        today_revenue: round2(orders.today_revenue),
        active_orders: orders.active_orders,
        occupied_tables,
        total_tables,
        today_payments_total: round2(today_payments_total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{order, payment, testing};
    use crate::db::test_pool;
    use shared::models::{OrderCreate, OrderItemCreate, PaymentCreate};

    async fn paid_order(pool: &SqlitePool, fx: &testing::Fixture) -> order::OrderDetail {
        let payload = OrderCreate {
            table_id: Some(fx.table_id),
            customer_name: Some("Siti".to_string()),
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
        let detail = order::create(pool, fx.waiter_id, payload, 0.10, 0.05)
            .await
            .expect("order");
        payment::process(
            pool,
            PaymentCreate {
                order_id: detail.order.id,
                amount: detail.order.total,
                payment_method: PaymentMethod::Cash,
                transaction_id: None,
            },
        )
        .await
        .expect("payment");
        detail
    }

    fn full_range() -> (i64, i64) {
        let now = now_millis();
        (now - 60_000, now + 60_000)
    }

    #[tokio::test]
    async fn summary_aggregates_revenue_and_payments() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;
        paid_order(&pool, &fx).await;

        let (start, end) = full_range();
        let report = summary(&pool, start, end).await.expect("summary");
        assert_eq!(report.total_transactions, 1);
        assert_eq!(report.total_revenue, 51750.0);
        assert_eq!(report.average_transaction, 51750.0);
        assert_eq!(report.unique_customers, 1);
        assert_eq!(report.previous_revenue, 0.0);
        assert!(report.revenue_change_pct.is_none());
        assert_eq!(report.payment_breakdown.len(), 1);
        assert_eq!(report.payment_breakdown[0].payment_method, PaymentMethod::Cash);
        assert_eq!(report.payment_breakdown[0].amount, 51750.0);
    }

    #[tokio::test]
    async fn menu_performance_includes_profit() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;
        paid_order(&pool, &fx).await;

        let (start, end) = full_range();
        let rows = menu_performance(&pool, start, end, 10).await.expect("perf");
        assert_eq!(rows.len(), 2);

        // ordered by revenue: nasi lemak 35000 first
        assert_eq!(rows[0].name, "Nasi Lemak");
        assert_eq!(rows[0].revenue, 35000.0);
        assert_eq!(rows[0].profit, 23000.0); // 35000 - 12000 cost
        assert_eq!(rows[1].quantity_sold, 2);
        assert_eq!(rows[1].profit, 8000.0); // 2 x (5000 - 1000)
    }

    #[tokio::test]
    async fn transactions_paginate_with_has_more() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;
        paid_order(&pool, &fx).await;
        paid_order(&pool, &fx).await;

        let (start, end) = full_range();
        let page = transactions(&pool, start, end, 1, 0).await.expect("page 1");
        assert_eq!(page.transactions.len(), 1);
        assert!(page.has_more);

        let page = transactions(&pool, start, end, 1, 1).await.expect("page 2");
        assert_eq!(page.transactions.len(), 1);
        assert!(!page.has_more);
        assert!(page.transactions[0].payment_number.is_some());
    }

    #[tokio::test]
    async fn export_of_empty_range_is_empty() {
        let pool = test_pool().await;
        testing::seed(&pool).await;

        let rows = export_rows(&pool, 0, 1).await.expect("export");
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn dashboard_reflects_today() {
        let pool = test_pool().await;
        let fx = testing::seed(&pool).await;
        paid_order(&pool, &fx).await;

        let stats = dashboard_stats(&pool).await.expect("stats");
        assert_eq!(stats.today_orders, 1);
        assert_eq!(stats.today_revenue, 51750.0);
        assert_eq!(stats.active_orders, 0);
        assert_eq!(stats.occupied_tables, 0);
        assert_eq!(stats.total_tables, 1);
        assert_eq!(stats.today_payments_total, 51750.0);
    }
}
