//! Booking Server - 预约撮合核心
//!
//! # 架构概述
//!
//! 客户按服务者发布的时段下单，服务者确认、拒绝或提议改期，
//! 无人响应的订单由超时扫描关闭。提供以下核心功能：
//!
//! - **时段注册表** (`slots`): 时段发布、占用、释放，保证不重复预约
//! - **订单状态机** (`orders`): 单一转换表 + 事件溯源 + 协商协议
//! - **超时处理** (`orders::timeout_resolver`): 响应超时、自动完成
//! - **数据库** (`db`): 嵌入式 redb 存储
//! - **认证** (`auth`): 外部签发的 JWT 校验
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! booking-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── auth/          # JWT 校验、CurrentActor 提取
//! ├── services/      # 服务目录、审计监听
//! ├── api/           # HTTP 路由和处理器
//! ├── utils/         # 日志、时区、校验
//! ├── db/            # redb 存储层
//! ├── slots/         # 时段注册表
//! └── orders/        # 订单状态机与超时处理
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod services;
pub mod slots;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentActor, JwtService};
pub use crate::core::{Config, Server, ServerState, build_app};
pub use db::BookingStorage;
pub use orders::{OrdersManager, TimeoutResolver};
pub use slots::SlotRegistry;
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

/// 设置运行环境：工作目录和日志
///
/// `.env` 由调用方在加载 [`Config`] 之前读取。
pub fn setup_environment(config: &Config) -> anyhow::Result<()> {
    std::fs::create_dir_all(&config.work_dir)?;
    let log_dir = config.log_dir();
    init_logger_with_file(&config.log_level, config.log_json, Some(log_dir.as_path()))?;
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____              __   _
   / __ )____  ____  / /__(_)___  ____ _
  / __  / __ \/ __ \/ //_/ / __ \/ __ `/
 / /_/ / /_/ / /_/ / ,< / / / / / /_/ /
/_____/\____/\____/_/|_/_/_/ /_/\__, /
                               /____/
    "#
    );
}
