//! Order API Module
//!
//! 所有变更都作为 [`OrderCommand`](shared::order::OrderCommand) 交给
//! OrdersManager；handler 只负责提取参与者和请求体。
//!
//! | 路径 | 方法 | 说明 | 参与方 |
//! |------|------|------|--------|
//! | /api/orders | POST | 创建订单 (占用时段) | client |
//! | /api/orders | GET | 我的订单 (?status=) | 任意 |
//! | /api/orders/{id} | GET | 订单详情 | 订单双方 |
//! | /api/orders/{id}/events | GET | 事件历史 | 订单双方 |
//! | /api/orders/{id}/confirm | PUT | 确认 | provider |
//! | /api/orders/{id}/decline | PUT | 拒绝 (客户对改期提议调用时视为拒绝提议) | provider / client |
//! | /api/orders/{id}/propose-time | PUT | 提议新时段 | provider |
//! | /api/orders/{id}/accept-proposed-time | PUT | 接受改期 | client |
//! | /api/orders/{id}/decline-proposed-time | PUT | 拒绝改期 | client |
//! | /api/orders/{id}/cancel | PUT | 取消已确认订单 | client |
//! | /api/orders/{id}/complete | PUT | 完成 (可附评分) | provider |

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/events", get(handler::events))
        .route("/{id}/confirm", put(handler::confirm))
        .route("/{id}/decline", put(handler::decline))
        .route("/{id}/propose-time", put(handler::propose_time))
        .route("/{id}/accept-proposed-time", put(handler::accept_proposed_time))
        .route("/{id}/decline-proposed-time", put(handler::decline_proposed_time))
        .route("/{id}/cancel", put(handler::cancel))
        .route("/{id}/complete", put(handler::complete))
}
