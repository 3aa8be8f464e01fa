use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{JwtService, LoginThrottle};
use crate::core::Config;
use crate::db::{DbService, seed};

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | SQLite 连接池 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | login_throttle | Arc<LoginThrottle> | 登录限流器 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 登录限流器
    pub login_throttle: Arc<LoginThrottle>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`Self::initialize`] 代替
    pub fn new(
        config: Config,
        pool: SqlitePool,
        jwt_service: Arc<JwtService>,
        login_throttle: Arc<LoginThrottle>,
    ) -> Self {
        Self {
            config,
            pool,
            jwt_service,
            login_throttle,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/pos.db) + 迁移
    /// 3. 默认数据 (管理员账号、系统设置)
    /// 4. JWT 服务与登录限流器
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        config.ensure_work_dir_structure()?;

        let db_path = config.database_dir().join("pos.db");
        let db = DbService::new(&db_path.to_string_lossy()).await?;

        seed::run(&db.pool).await?;

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let login_throttle = Arc::new(LoginThrottle::default());

        Ok(Self::new(config.clone(), db.pool, jwt_service, login_throttle))
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
