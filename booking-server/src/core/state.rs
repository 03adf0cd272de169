use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::JwtService;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result};
use crate::db::BookingStorage;
use crate::orders::{OrdersManager, TimeoutResolver};
use crate::services::{AuditListener, CatalogService};
use crate::slots::SlotRegistry;
use crate::utils::logger::cleanup_old_logs;

/// 日志清理间隔
const LOG_CLEANUP_INTERVAL: Duration = Duration::from_secs(24 * 3600);

/// 服务器状态 - 持有所有服务的单例引用
///
/// 使用 Arc 实现浅拷贝，每个 handler 拿到的都是同一组服务。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | storage | BookingStorage | redb 存储 |
/// | slots | SlotRegistry | 时段注册表 |
/// | catalog | Arc<CatalogService> | 服务项目/款式目录 |
/// | orders_manager | Arc<OrdersManager> | 订单状态机 |
/// | jwt_service | Arc<JwtService> | JWT 校验 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (redb)
    pub storage: BookingStorage,
    pub slots: SlotRegistry,
    pub catalog: Arc<CatalogService>,
    /// 订单状态机 (命令处理 + 事件广播)
    pub orders_manager: Arc<OrdersManager>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 在已打开的存储上组装所有服务
    ///
    /// 测试使用内存数据库时直接调用。
    pub fn with_storage(config: Config, storage: BookingStorage) -> Self {
        let slots = SlotRegistry::new(storage.clone(), config.timezone);
        let catalog = Arc::new(CatalogService::new(storage.clone()));
        let orders_manager = Arc::new(OrdersManager::new(
            storage.clone(),
            slots.clone(),
            catalog.clone(),
            config.policy,
        ));
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self {
            config,
            storage,
            slots,
            catalog,
            orders_manager,
            jwt_service,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录 (work_dir, logs)
    /// 2. 数据库 (work_dir/booking.redb)
    /// 3. 各服务 (SlotRegistry, Catalog, OrdersManager, JWT)
    /// 4. 目录缓存预热
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        std::fs::create_dir_all(config.log_dir())?;

        let storage = BookingStorage::open(config.db_path())?;
        tracing::info!(path = %config.db_path().display(), "Database opened");

        let state = Self::with_storage(config.clone(), storage);
        state.catalog.warmup()?;
        Ok(state)
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 之前调用。
    ///
    /// | 任务 | 类型 | 说明 |
    /// |------|------|------|
    /// | storage_stats | Warmup | 启动时打印存储统计 |
    /// | audit_listener | Listener | 订单事件 → audit 日志 |
    /// | timeout_resolver | Periodic | 超时 / 自动完成扫描 |
    /// | log_cleanup | Periodic | 清理过期应用日志 |
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let storage = self.storage.clone();
        tasks.spawn("storage_stats", TaskKind::Warmup, async move {
            match tokio::task::spawn_blocking(move || storage.get_stats()).await {
                Ok(Ok(stats)) => tracing::info!(
                    slots = stats.slot_count,
                    orders = stats.order_count,
                    events = stats.event_count,
                    due = stats.due_order_count,
                    "Storage loaded"
                ),
                Ok(Err(e)) => tracing::warn!(error = %e, "Failed to read storage stats"),
                Err(e) => tracing::warn!(error = %e, "Storage stats task failed"),
            }
        });

        let listener = AuditListener::new(self.orders_manager.subscribe(), tasks.shutdown_token());
        tasks.spawn("audit_listener", TaskKind::Listener, async move {
            listener.run().await;
        });

        let resolver = TimeoutResolver::new(
            self.orders_manager.clone(),
            Duration::from_secs(self.config.resolver_interval_secs.max(1)),
            tasks.shutdown_token(),
        );
        tasks.spawn("timeout_resolver", TaskKind::Periodic, resolver.run());

        let log_dir = self.config.log_dir();
        let token = tasks.shutdown_token();
        tasks.spawn("log_cleanup", TaskKind::Periodic, async move {
            loop {
                match cleanup_old_logs(&log_dir) {
                    Ok(0) => {}
                    Ok(n) => tracing::info!(removed = n, "Old log files cleaned up"),
                    Err(e) => tracing::warn!(error = %e, "Log cleanup failed"),
                }
                tokio::select! {
                    _ = tokio::time::sleep(LOG_CLEANUP_INTERVAL) => {}
                    _ = token.cancelled() => break,
                }
            }
        });

        tasks.log_summary();
        tasks
    }

    /// 获取 JWT 服务
    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }
}
