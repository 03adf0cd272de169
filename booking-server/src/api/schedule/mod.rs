//! Schedule API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/providers/{id}/schedule | GET | 按天分组的时段 (?from&to&all) |
//!
//! 默认只返回 `available` 时段；服务者本人传 `all=true` 时返回全部状态。

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/providers/{id}/schedule", get(handler::get_schedule))
}
