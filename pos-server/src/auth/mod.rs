//! 认证模块
//!
//! JWT 令牌、密码哈希、登录限流和 Axum 认证中间件。

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod throttle;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth, require_permission};
pub use password::{hash_password, verify_password};
pub use throttle::LoginThrottle;
