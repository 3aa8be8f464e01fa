/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Current server time formatted for the response envelope (`YYYY-MM-DD HH:MM:SS` UTC).
pub fn timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Generate a Snowflake-style i64 for use as resource ID.
///
/// Layout (53 bits, fits in JavaScript's Number.MAX_SAFE_INTEGER):
///   - 41 bits: milliseconds since 2024-01-01 UTC (~69 years)
///   - 12 bits: per-process sequence, randomly seeded at startup
///
/// The sequence makes IDs minted in the same millisecond distinct for up
/// to 4096 per burst; the random seed keeps restarts within the same
/// millisecond from replaying the sequence.
pub fn snowflake_id() -> i64 {
    use rand::Rng;
    use std::sync::OnceLock;
    use std::sync::atomic::{AtomicI64, Ordering};

    // Custom epoch: 2024-01-01 00:00:00 UTC
    const EPOCH_MS: i64 = 1_704_067_200_000;
    static SEQUENCE: AtomicI64 = AtomicI64::new(0);
    static SEED: OnceLock<i64> = OnceLock::new();

    let seed = *SEED.get_or_init(|| rand::thread_rng().gen_range(0..0x1000));
    let seq = (seed + SEQUENCE.fetch_add(1, Ordering::Relaxed)) & 0xFFF; // 12 bits
    let now = now_millis();
    let ts = (now - EPOCH_MS) & 0x1FF_FFFF_FFFF; // 41 bits
    (ts << 12) | seq
}

/// Round a monetary amount to 2 decimal places.
///
/// All money in the system is f64; every derived amount (tax, service
/// charge, totals) must pass through here before being stored or compared.
pub fn round2(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snowflake_fits_js_safe_integer() {
        for _ in 0..100 {
            let id = snowflake_id();
            assert!(id > 0);
            assert!(id <= 0x1F_FFFF_FFFF_FFFF); // 2^53 - 1
        }
    }

    #[test]
    fn snowflake_burst_is_collision_free() {
        let ids: Vec<i64> = (0..200).map(|_| snowflake_id()).collect();
        let unique: std::collections::HashSet<i64> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn round2_half_up() {
        assert_eq!(round2(1234.5678), 1234.57);
        assert_eq!(round2(4500.0), 4500.0);
        assert_eq!(round2(0.1 + 0.2), 0.3);
    }
}
