//! 时间工具函数 — 日期区间转换
//!
//! 所有日期→时间戳转换统一在 API handler 层完成，
//! repository 层只接收 `i64` Unix millis。区间语义为 `[start, end)`。

use chrono::NaiveDate;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 日期开始 (00:00:00 UTC) → Unix millis
pub fn day_start_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
        .timestamp_millis()
}

/// 日期结束 → 次日 00:00:00 UTC 的 Unix millis
///
/// 返回次日零点时间戳，调用方使用 `< end` (不含) 语义。
pub fn day_end_millis(date: NaiveDate) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    day_start_millis(next_day)
}

/// 解析 `start_date`/`end_date` 查询参数为半开毫秒区间
pub fn date_range_millis(start_date: &str, end_date: &str) -> AppResult<(i64, i64)> {
    let start = parse_date(start_date)?;
    let end = parse_date(end_date)?;
    if start > end {
        return Err(AppError::validation(format!(
            "start_date {start} is after end_date {end}"
        )));
    }
    Ok((day_start_millis(start), day_end_millis(end)))
}

/// 今天的日期 (UTC)
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Unix millis → `YYYY-MM-DD HH:MM:SS` UTC (CSV 导出用)
pub fn format_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_validates_format() {
        assert!(parse_date("2026-01-15").is_ok());
        assert!(parse_date("15/01/2026").is_err());
        assert!(parse_date("2026-13-01").is_err());
    }

    #[test]
    fn day_bounds_are_half_open() {
        let date = parse_date("2026-01-15").unwrap();
        let start = day_start_millis(date);
        let end = day_end_millis(date);
        assert_eq!(end - start, 24 * 3600 * 1000);
    }

    #[test]
    fn range_rejects_inverted_dates() {
        assert!(date_range_millis("2026-01-01", "2026-01-31").is_ok());
        assert!(date_range_millis("2026-01-31", "2026-01-01").is_err());
    }

    #[test]
    fn format_millis_utc() {
        let date = parse_date("2026-01-15").unwrap();
        assert_eq!(format_millis(day_start_millis(date)), "2026-01-15 00:00:00");
    }
}
