//! POS Server - 餐厅收银系统后端
//!
//! # 架构概述
//!
//! 单体 HTTP 服务，提供餐厅运营的完整后端：
//!
//! - **认证** (`auth`): JWT + Argon2 认证体系，角色权限矩阵
//! - **数据库** (`db`): 嵌入式 SQLite 存储 (WAL 模式)
//! - **HTTP API** (`api`): RESTful API 接口
//! - **业务流程**: 菜单 → 点单 → 厨房 → 支付 → 报表
//!
//! # 模块结构
//!
//! ```text
//! pos-server/src/
//! ├── core/          # 配置、状态、HTTP 服务
//! ├── auth/          # JWT 认证、密码、限流
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层 (连接池、仓储、种子数据)
//! └── utils/         # 错误、日志、校验、时间工具
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境 (dotenv + 日志)
pub fn setup_environment() -> anyhow::Result<()> {
    // .env 不存在时静默忽略
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(Some(&log_level), log_dir.as_deref());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____  ____  _____    _____
   / __ \/ __ \/ ___/   / ___/___  ______   _____  _____
  / /_/ / / / /\__ \    \__ \/ _ \/ ___/ | / / _ \/ ___/
 / ____/ /_/ /___/ /   ___/ /  __/ /   | |/ /  __/ /
/_/    \____//____/   /____/\___/_/    |___/\___/_/
    "#
    );
}
