//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单命令与查询
//! - [`schedule`] - 服务者排期查询
//! - [`slots`] - 服务者时段管理
//! - [`catalog`] - 服务项目与款式登记
//!
//! 所有 handler 通过 [`CurrentActor`](crate::auth::CurrentActor) 提取当前
//! 参与者 (health 除外)。订单状态机和时段注册表是同步的 redb 调用，
//! 在 handler 中通过 [`run_blocking`] 放到阻塞线程池执行。

pub mod catalog;
pub mod health;
pub mod orders;
pub mod schedule;
pub mod slots;

// Re-export common types for handlers
pub use crate::utils::{AppError, AppResult};

/// 在阻塞线程池上执行同步存储操作
pub async fn run_blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::internal(format!("Blocking task failed: {e}")))?
}
