use std::path::PathBuf;
use std::str::FromStr;

use chrono_tz::Tz;
use thiserror::Error;

use crate::auth::{JwtConfig, JwtError};

/// 订单时效策略
///
/// 所有窗口都以毫秒保存，状态机只做整数比较。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderPolicy {
    /// 服务者响应新订单的窗口
    pub response_window_ms: i64,
    /// 客户响应改期提议的窗口
    pub proposal_response_window_ms: i64,
    /// 预约时间之后多久自动完成
    pub auto_complete_grace_ms: i64,
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            response_window_ms: 300 * 1000,
            proposal_response_window_ms: 86_400 * 1000,
            auto_complete_grace_ms: 3_600 * 1000,
        }
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid JWT configuration: {0}")]
    Jwt(#[from] JwtError),

    #[error("Unknown time zone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: &'static str,
    },
}

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | 控制台 JSON 日志 |
/// | BUSINESS_TIMEZONE | UTC | 业务时区 (IANA) |
/// | RESPONSE_WINDOW_SECS | 300 | 服务者响应窗口 |
/// | PROPOSAL_RESPONSE_WINDOW_SECS | 86400 | 客户响应改期窗口 |
/// | RESOLVER_INTERVAL_SECS | 60 | 超时扫描间隔 |
/// | AUTO_COMPLETE_GRACE_SECS | 3600 | 自动完成宽限期 |
/// | MAX_SCHEDULE_RANGE_DAYS | 62 | 排期查询最大跨度 |
/// | REQUEST_TIMEOUT_MS | 30000 | 请求超时(毫秒) |
/// | JWT_SECRET / JWT_ISSUER / JWT_AUDIENCE | - | 令牌校验 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/booking RESPONSE_WINDOW_SECS=600 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    /// 业务时区，时段的日期/时刻按此解释
    pub timezone: Tz,
    pub policy: OrderPolicy,
    /// 超时扫描间隔 (秒)
    pub resolver_interval_secs: u64,
    pub max_schedule_range_days: i64,
    /// 请求超时时间 (毫秒)
    pub request_timeout_ms: u64,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 秒数配置 → 毫秒
///
/// 未设置时用默认值；设置了就必须是 `u32` 秒数，`allow_zero` 为 false 时不接受 0。
fn window_ms(
    key: &str,
    raw: Option<String>,
    default_secs: u32,
    allow_zero: bool,
) -> Result<i64, ConfigError> {
    let invalid = |value: &str, reason| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason,
    };
    let secs = match raw {
        None => default_secs,
        Some(value) => {
            let secs: u32 = value
                .trim()
                .parse()
                .map_err(|_| invalid(&value, "expected whole seconds"))?;
            if secs == 0 && !allow_zero {
                return Err(invalid(&value, "must be positive"));
            }
            secs
        }
    };
    i64::from(secs)
        .checked_mul(1000)
        .ok_or_else(|| invalid(&secs.to_string(), "out of range"))
}

/// 正整数配置 (天数等)
fn positive_or(key: &str, raw: Option<String>, default: u32) -> Result<u32, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => match value.trim().parse::<u32>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                value,
                reason: "expected a positive integer",
            }),
        },
    }
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        let tz_name = std::env::var("BUSINESS_TIMEZONE").unwrap_or_else(|_| "UTC".into());
        let timezone: Tz = tz_name
            .parse()
            .map_err(|_| ConfigError::InvalidTimezone(tz_name.clone()))?;

        let var = |key: &str| std::env::var(key).ok();
        let policy = OrderPolicy {
            response_window_ms: window_ms(
                "RESPONSE_WINDOW_SECS",
                var("RESPONSE_WINDOW_SECS"),
                300,
                false,
            )?,
            proposal_response_window_ms: window_ms(
                "PROPOSAL_RESPONSE_WINDOW_SECS",
                var("PROPOSAL_RESPONSE_WINDOW_SECS"),
                86_400,
                false,
            )?,
            auto_complete_grace_ms: window_ms(
                "AUTO_COMPLETE_GRACE_SECS",
                var("AUTO_COMPLETE_GRACE_SECS"),
                3_600,
                true,
            )?,
        };
        let resolver_interval_secs =
            positive_or("RESOLVER_INTERVAL_SECS", var("RESOLVER_INTERVAL_SECS"), 60)?;
        let max_schedule_range_days =
            positive_or("MAX_SCHEDULE_RANGE_DAYS", var("MAX_SCHEDULE_RANGE_DAYS"), 62)?;

        Ok(Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: env_or("HTTP_PORT", 3000),
            jwt: JwtConfig::from_env()?,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            timezone,
            policy,
            resolver_interval_secs: u64::from(resolver_interval_secs),
            max_schedule_range_days: i64::from(max_schedule_range_days),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30000),
        })
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(
        work_dir: impl Into<String>,
        http_port: u16,
        jwt: JwtConfig,
    ) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port,
            jwt,
            environment: "development".into(),
            log_level: "info".into(),
            log_json: false,
            timezone: chrono_tz::UTC,
            policy: OrderPolicy::default(),
            resolver_interval_secs: 60,
            max_schedule_range_days: 62,
            request_timeout_ms: 30000,
        }
    }

    /// redb 数据库文件
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("booking.redb")
    }

    pub fn log_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
