//! Report API Handlers
//!
//! All endpoints take a `start_date`/`end_date` window (YYYY-MM-DD,
//! inclusive dates mapped to a half-open millis range).

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, header},
    response::IntoResponse,
};
use serde::Deserialize;
use shared::ApiResponse;

use crate::core::ServerState;
use crate::db::repository::report::{
    self as report_repo, CategoryBreakdownRow, MenuPerformanceRow, SalesSummary, SalesTrendRow,
    TransactionPage, TransactionRow,
};
use crate::utils::time::{date_range_millis, format_millis};
use crate::utils::{AppError, AppResult, ok};

#[derive(Deserialize)]
pub struct RangeQuery {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Deserialize)]
pub struct TopQuery {
    pub start_date: String,
    pub end_date: String,
    #[serde(default = "default_top_limit")]
    pub limit: i64,
}

fn default_top_limit() -> i64 {
    10
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub start_date: String,
    pub end_date: String,
    #[serde(default = "default_page_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_page_limit() -> i64 {
    50
}

/// GET /api/reports/summary - 营业汇总 (含上一周期对比)
pub async fn summary(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<ApiResponse<SalesSummary>>> {
    let (start_ms, end_ms) = date_range_millis(&query.start_date, &query.end_date)?;
    let report = report_repo::summary(&state.pool, start_ms, end_ms)
        .await
        .map_err(AppError::from)?;
    Ok(ok(report))
}

/// GET /api/reports/sales-trend - 按日销售趋势
pub async fn sales_trend(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<ApiResponse<Vec<SalesTrendRow>>>> {
    let (start_ms, end_ms) = date_range_millis(&query.start_date, &query.end_date)?;
    let rows = report_repo::sales_trend(&state.pool, start_ms, end_ms)
        .await
        .map_err(AppError::from)?;
    Ok(ok(rows))
}

/// GET /api/reports/menu-performance - 菜品销售排行
pub async fn menu_performance(
    State(state): State<ServerState>,
    Query(query): Query<TopQuery>,
) -> AppResult<Json<ApiResponse<Vec<MenuPerformanceRow>>>> {
    let (start_ms, end_ms) = date_range_millis(&query.start_date, &query.end_date)?;
    let rows = report_repo::menu_performance(&state.pool, start_ms, end_ms, query.limit)
        .await
        .map_err(AppError::from)?;
    Ok(ok(rows))
}

/// GET /api/reports/category-breakdown - 按分类统计
pub async fn category_breakdown(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Json<ApiResponse<Vec<CategoryBreakdownRow>>>> {
    let (start_ms, end_ms) = date_range_millis(&query.start_date, &query.end_date)?;
    let rows = report_repo::category_breakdown(&state.pool, start_ms, end_ms)
        .await
        .map_err(AppError::from)?;
    Ok(ok(rows))
}

/// GET /api/reports/transactions - 交易分页列表
pub async fn transactions(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<ApiResponse<TransactionPage>>> {
    let (start_ms, end_ms) = date_range_millis(&query.start_date, &query.end_date)?;
    let page =
        report_repo::transactions(&state.pool, start_ms, end_ms, query.limit, query.offset)
            .await
            .map_err(AppError::from)?;
    Ok(ok(page))
}

/// GET /api/reports/export - CSV 导出
///
/// UTF-8 BOM + 表头；空区间返回仅含表头的文件 (不报错)。
pub async fn export(
    State(state): State<ServerState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<impl IntoResponse> {
    let (start_ms, end_ms) = date_range_millis(&query.start_date, &query.end_date)?;
    let rows = report_repo::export_rows(&state.pool, start_ms, end_ms)
        .await
        .map_err(AppError::from)?;

    let csv = build_csv(&rows);
    let filename = format!("orders_{}_{}.csv", query.start_date, query.end_date);

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
            .map_err(|e| AppError::internal(format!("Invalid filename header: {e}")))?,
    );
    Ok((headers, csv))
}

/// Escape a CSV field per RFC 4180
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn build_csv(rows: &[TransactionRow]) -> String {
    // BOM so Excel opens UTF-8 correctly
    let mut out = String::from("\u{feff}");
    out.push_str(
        "Order Number,Date,Type,Status,Customer,Table,Total,Payment Method,Payment Number\n",
    );
    for row in rows {
        let fields = [
            csv_field(&row.order_number),
            format_millis(row.created_at),
            row.order_type.as_str().to_string(),
            row.status.as_str().to_string(),
            csv_field(row.customer_name.as_deref().unwrap_or("")),
            csv_field(row.table_number.as_deref().unwrap_or("")),
            format!("{:.2}", row.total),
            row.payment_method
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            csv_field(row.payment_number.as_deref().unwrap_or("")),
        ];
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{OrderStatus, OrderType, PaymentMethod};

    fn sample_row() -> TransactionRow {
        TransactionRow {
            order_id: 1,
            order_number: "ORD-20260826-0001".to_string(),
            order_type: OrderType::DineIn,
            status: OrderStatus::Completed,
            customer_name: Some("Tan, Ah Kow".to_string()),
            table_number: Some("T1".to_string()),
            total: 51750.0,
            payment_method: Some(PaymentMethod::Cash),
            payment_number: Some("PAY-20260826-0001".to_string()),
            created_at: 1_767_225_600_000,
        }
    }

    #[test]
    fn empty_export_is_bom_plus_header_only() {
        let csv = build_csv(&[]);
        assert!(csv.starts_with('\u{feff}'));
        assert_eq!(csv.lines().count(), 1);
        assert!(csv.contains("Order Number,"));
    }

    #[test]
    fn fields_with_commas_are_quoted() {
        let csv = build_csv(&[sample_row()]);
        assert!(csv.contains("\"Tan, Ah Kow\""));
        assert!(csv.contains("ORD-20260826-0001"));
        assert!(csv.contains("51750.00"));
        assert_eq!(csv.lines().count(), 2);
    }
}
