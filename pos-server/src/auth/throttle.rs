//! 登录限流
//!
//! 按用户名记录失败时间戳，滚动窗口内超过上限则拒绝后续尝试。
//! 登录成功时清空该用户的失败记录。内存实现，进程重启后重置。

use dashmap::DashMap;
use shared::util::now_millis;

/// 滚动窗口登录限流器
pub struct LoginThrottle {
    /// username → 窗口内的失败时间戳 (millis)
    attempts: DashMap<String, Vec<i64>>,
    max_attempts: usize,
    window_ms: i64,
}

impl Default for LoginThrottle {
    fn default() -> Self {
        // 5 次失败 / 15 分钟
        Self::new(5, 15 * 60 * 1000)
    }
}

impl LoginThrottle {
    pub fn new(max_attempts: usize, window_ms: i64) -> Self {
        Self {
            attempts: DashMap::new(),
            max_attempts,
            window_ms,
        }
    }

    /// 该用户名当前是否允许尝试登录
    pub fn check(&self, username: &str) -> bool {
        self.check_at(username, now_millis())
    }

    /// 记录一次失败尝试
    pub fn record_failure(&self, username: &str) {
        self.record_failure_at(username, now_millis());
    }

    /// 登录成功后清空失败记录
    pub fn reset(&self, username: &str) {
        self.attempts.remove(username);
    }

    fn check_at(&self, username: &str, now: i64) -> bool {
        match self.attempts.get_mut(username) {
            Some(mut entry) => {
                let cutoff = now - self.window_ms;
                entry.retain(|&ts| ts > cutoff);
                entry.len() < self.max_attempts
            }
            None => true,
        }
    }

    fn record_failure_at(&self, username: &str, now: i64) {
        let cutoff = now - self.window_ms;
        let mut entry = self.attempts.entry(username.to_string()).or_default();
        entry.retain(|&ts| ts > cutoff);
        entry.push(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: i64 = 15 * 60 * 1000;

    #[test]
    fn allows_until_limit() {
        let throttle = LoginThrottle::new(5, WINDOW);
        let t0 = 1_000_000;

        for i in 0..4 {
            throttle.record_failure_at("maria", t0 + i);
            assert!(throttle.check_at("maria", t0 + i));
        }
        throttle.record_failure_at("maria", t0 + 4);
        assert!(!throttle.check_at("maria", t0 + 5));
    }

    #[test]
    fn reset_on_success() {
        let throttle = LoginThrottle::new(5, WINDOW);
        let t0 = 1_000_000;
        for i in 0..5 {
            throttle.record_failure_at("maria", t0 + i);
        }
        assert!(!throttle.check_at("maria", t0 + 10));

        throttle.reset("maria");
        assert!(throttle.check_at("maria", t0 + 11));
    }

    #[test]
    fn window_expiry_frees_slots() {
        let throttle = LoginThrottle::new(5, WINDOW);
        let t0 = 1_000_000;
        for i in 0..5 {
            throttle.record_failure_at("maria", t0 + i);
        }
        assert!(!throttle.check_at("maria", t0 + 100));
        // past the rolling window the old failures no longer count
        assert!(throttle.check_at("maria", t0 + WINDOW + 10));
    }

    #[test]
    fn usernames_are_isolated() {
        let throttle = LoginThrottle::new(5, WINDOW);
        let t0 = 1_000_000;
        for i in 0..5 {
            throttle.record_failure_at("maria", t0 + i);
        }
        assert!(!throttle.check_at("maria", t0 + 10));
        assert!(throttle.check_at("chef", t0 + 10));
    }
}
