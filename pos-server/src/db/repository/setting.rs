//! Settings Repository
//!
//! Key-value store for restaurant configuration. Defaults are seeded
//! once at startup with INSERT OR IGNORE so operator edits survive
//! restarts.

use super::RepoResult;
use shared::models::{Setting, SettingUpsert};
use shared::util::now_millis;
use sqlx::SqlitePool;

const SETTING_SELECT: &str =
    "SELECT setting_key, setting_value, setting_type, description, updated_at FROM setting";

/// (key, value, type, description)
const DEFAULTS: &[(&str, &str, &str, &str)] = &[
    ("restaurant_name", "Restoran Seri Wangi", "string", "Restaurant display name"),
    ("restaurant_address", "Jalan Merdeka 1, Kuala Lumpur", "string", "Printed on receipts"),
    ("restaurant_phone", "+60 3-1234 5678", "string", "Contact phone"),
    ("currency", "IDR", "string", "Currency code"),
    ("tax_rate", "0.10", "number", "Tax applied to subtotal"),
    ("service_charge_rate", "0.05", "number", "Service charge for dine-in orders"),
    ("bank_name", "Maybank", "string", "Bank transfer destination"),
    ("bank_account_number", "512345678901", "string", "Bank account number"),
    ("bank_account_holder", "Seri Wangi Sdn Bhd", "string", "Bank account holder"),
    ("ewallet_provider", "Touch 'n Go", "string", "Accepted e-wallet provider"),
    ("ewallet_number", "+60 12-345 6789", "string", "E-wallet account"),
    ("receipt_header", "Terima kasih! Welcome!", "string", "Printed above receipt items"),
    ("receipt_footer", "Sila datang lagi", "string", "Printed below receipt totals"),
];

/// Seed default settings, keeping any existing values.
pub async fn ensure_seeded(pool: &SqlitePool) -> RepoResult<()> {
    let now = now_millis();
    for (key, value, setting_type, description) in DEFAULTS {
        sqlx::query(
            "INSERT OR IGNORE INTO setting (setting_key, setting_value, setting_type, description, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(key)
        .bind(value)
        .bind(setting_type)
        .bind(description)
        .bind(now)
        .execute(pool)
        .await?;
    }
    Ok(())
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Setting>> {
    let sql = format!("{SETTING_SELECT} ORDER BY setting_key");
    let rows = sqlx::query_as::<_, Setting>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_key(pool: &SqlitePool, key: &str) -> RepoResult<Option<Setting>> {
    let sql = format!("{SETTING_SELECT} WHERE setting_key = ?");
    let row = sqlx::query_as::<_, Setting>(&sql)
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn upsert(pool: &SqlitePool, data: &SettingUpsert) -> RepoResult<Setting> {
    let now = now_millis();
    sqlx::query(
        "INSERT INTO setting (setting_key, setting_value, setting_type, description, updated_at) VALUES (?, ?, COALESCE(?, 'string'), ?, ?) ON CONFLICT(setting_key) DO UPDATE SET setting_value = excluded.setting_value, setting_type = COALESCE(?, setting_type), description = COALESCE(?, description), updated_at = excluded.updated_at",
    )
    .bind(&data.setting_key)
    .bind(&data.setting_value)
    .bind(&data.setting_type)
    .bind(&data.description)
    .bind(now)
    .bind(&data.setting_type)
    .bind(&data.description)
    .execute(pool)
    .await?;

    find_by_key(pool, &data.setting_key)
        .await?
        .ok_or_else(|| super::RepoError::Database("Failed to persist setting".into()))
}

/// Numeric setting with a fallback when missing or unparseable.
pub async fn get_f64(pool: &SqlitePool, key: &str, default: f64) -> RepoResult<f64> {
    let value = find_by_key(pool, key)
        .await?
        .and_then(|s| s.setting_value.parse::<f64>().ok())
        .unwrap_or(default);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn seeding_is_idempotent_and_preserves_edits() {
        let pool = test_pool().await;
        ensure_seeded(&pool).await.expect("seed");

        upsert(
            &pool,
            &SettingUpsert {
                setting_key: "tax_rate".to_string(),
                setting_value: "0.08".to_string(),
                setting_type: None,
                description: None,
            },
        )
        .await
        .expect("edit");

        // re-seed must not clobber the operator's value
        ensure_seeded(&pool).await.expect("reseed");
        let rate = get_f64(&pool, "tax_rate", 0.10).await.expect("get");
        assert_eq!(rate, 0.08);
    }

    #[tokio::test]
    async fn get_f64_falls_back_on_missing_or_bad_value() {
        let pool = test_pool().await;
        ensure_seeded(&pool).await.expect("seed");

        let missing = get_f64(&pool, "no_such_key", 0.42).await.expect("missing");
        assert_eq!(missing, 0.42);

        upsert(
            &pool,
            &SettingUpsert {
                setting_key: "tax_rate".to_string(),
                setting_value: "not-a-number".to_string(),
                setting_type: None,
                description: None,
            },
        )
        .await
        .expect("corrupt");
        let fallback = get_f64(&pool, "tax_rate", 0.10).await.expect("fallback");
        assert_eq!(fallback, 0.10);
    }

    #[tokio::test]
    async fn upsert_inserts_new_keys() {
        let pool = test_pool().await;

        let setting = upsert(
            &pool,
            &SettingUpsert {
                setting_key: "operating_hours".to_string(),
                setting_value: "10:00-22:00".to_string(),
                setting_type: Some("string".to_string()),
                description: Some("Displayed on the customer screen".to_string()),
            },
        )
        .await
        .expect("insert");
        assert_eq!(setting.setting_value, "10:00-22:00");
        assert_eq!(setting.setting_type, "string");
    }
}
