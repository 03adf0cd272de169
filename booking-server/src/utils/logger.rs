//! 日志基础设施
//!
//! | 输出 | 目录 | 轮转 | 保留 |
//! |------|------|------|------|
//! | 控制台 | - | - | - |
//! | 应用日志 | `logs/app/` | 每日 | 14 天 |
//! | 审计日志 (target `audit`) | `logs/audit/` | 每日 | 永久 |
//! | 安全日志 (target `security`) | `logs/security/` | 每日 | 永久 |
//!
//! 订单状态变更写入 `audit`，鉴权失败写入 `security`。

use std::fs;
use std::path::Path;
use tracing::Subscriber;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, filter, fmt, prelude::*, registry::LookupSpan};

/// 应用日志保留天数
pub const APP_LOG_RETENTION_DAYS: i64 = 14;

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// 删除超过保留期的 `app.YYYY-MM-DD` 日志文件
///
/// audit/security 目录不受影响。
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let app_dir = log_dir.join("app");
    if !app_dir.exists() {
        return Ok(0);
    }

    let cutoff = chrono::Local::now().date_naive() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);
    let mut removed = 0;

    for entry in fs::read_dir(app_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        // RollingFileAppender 文件名: app.YYYY-MM-DD
        let Some(date_part) = name.strip_prefix("app.") else {
            continue;
        };
        if let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            removed += 1;
            tracing::info!(file = %name, "Deleted old log file");
        }
    }

    Ok(removed)
}

fn console_layer<S>(level: &str, json_format: bool) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .with_filter(env_filter)
            .boxed()
    } else {
        fmt::layer()
            .pretty()
            .with_target(true)
            .with_filter(env_filter)
            .boxed()
    }
}

/// 单个日志文件层: JSON 格式，按 target 过滤
fn file_layer<S>(
    dir: &Path,
    prefix: &str,
    level: &str,
    keep: fn(&str) -> bool,
) -> anyhow::Result<BoxedLayer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let sub_dir = dir.join(prefix);
    fs::create_dir_all(&sub_dir)?;

    let appender = RollingFileAppender::new(Rotation::DAILY, sub_dir, prefix);
    Ok(fmt::layer()
        .json()
        .with_target(true)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(appender))
        .with_filter(EnvFilter::new(level))
        .with_filter(filter::filter_fn(move |meta| keep(meta.target())))
        .boxed())
}

/// 初始化日志系统
///
/// # Arguments
/// * `level` - 日志级别 (`RUST_LOG` 优先)
/// * `json_format` - 控制台是否输出 JSON (生产环境)
/// * `log_dir` - 文件日志目录，`None` 时仅输出到控制台
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&Path>,
) -> anyhow::Result<()> {
    let mut layers: Vec<BoxedLayer<tracing_subscriber::Registry>> =
        vec![console_layer(level, json_format)];

    if let Some(dir) = log_dir {
        layers.push(file_layer(dir, "app", level, |t| {
            t != "audit" && t != "security"
        })?);
        layers.push(file_layer(dir, "audit", "info", |t| t == "audit")?);
        layers.push(file_layer(dir, "security", "info", |t| t == "security")?);
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {e}"))
}

/// 仅控制台输出
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}

/// 审计日志 - 订单状态变更、时段管理
///
/// ```ignore
/// audit_log!(actor.id, "order.confirm", order.id);
/// ```
#[macro_export]
macro_rules! audit_log {
    ($actor_id:expr, $action:expr, $resource:expr) => {
        tracing::info!(
            target: "audit",
            actor_id = %$actor_id,
            action = %$action,
            resource = %$resource,
            "AUDIT"
        );
    };
    ($actor_id:expr, $action:expr, $resource:expr, $($arg:tt)+) => {
        tracing::info!(
            target: "audit",
            actor_id = %$actor_id,
            action = %$action,
            resource = %$resource,
            $($arg)+
        );
    };
}

/// 安全日志 - 鉴权失败、越权访问
///
/// ```ignore
/// security_log!(WARN, "auth_failed", error = %e, uri = %uri);
/// ```
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(target: "security", event = $event, $($arg)*)
    };
    (ERROR, $event:expr, $($arg:tt)*) => {
        tracing::error!(target: "security", event = $event, $($arg)*)
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(target: "security", event = $event, $($arg)*)
    };
}
