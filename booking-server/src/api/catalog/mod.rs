//! Catalog API Module
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/catalog/services/{id} | PUT | 登记/更新服务项目 | provider |
//! | /api/catalog/designs/{id} | PUT | 登记/更新款式 | provider |
//! | /api/providers/{id}/services | GET | 服务者的服务项目 | 任意 |
//! | /api/providers/{id}/designs | GET | 服务者的款式 | 任意 |
//!
//! 价格变更只影响之后创建的订单，已有订单保存创建时的价格快照。

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/catalog/services/{id}", put(handler::upsert_service))
        .route("/api/catalog/designs/{id}", put(handler::upsert_design))
        .route("/api/providers/{id}/services", get(handler::list_services))
        .route("/api/providers/{id}/designs", get(handler::list_designs))
}
