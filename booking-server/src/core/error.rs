//! 启动期错误
//!
//! 请求处理使用 [`AppError`](crate::utils::AppError)；这里只覆盖
//! 服务器装配和运行阶段 (配置、数据库、监听端口) 的失败。

use thiserror::Error;

use super::config::ConfigError;
use crate::db::StorageError;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("数据库错误: {0}")]
    Storage(#[from] StorageError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部服务器错误: {0}")]
    Internal(#[from] anyhow::Error),
}

/// 启动流程的 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err: ServerError = ConfigError::InvalidTimezone("Mars/Base".into()).into();
        assert!(matches!(err, ServerError::Config(_)));
        assert!(err.to_string().contains("Mars/Base"));

        let err: ServerError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, ServerError::Internal(_)));
    }
}
