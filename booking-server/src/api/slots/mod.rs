//! Slot API Module
//!
//! 服务者管理自己的时段，所有路由只接受 provider 令牌。
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/slots | POST | 发布时段 |
//! | /api/slots/{id}/block | PUT | 关闭 (available → blocked) |
//! | /api/slots/{id}/unblock | PUT | 重新开放 |
//! | /api/slots/{id} | DELETE | 删除 available/blocked 时段 |

mod handler;

use axum::{
    Router,
    routing::{delete, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/slots", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/{id}", delete(handler::remove))
        .route("/{id}/block", put(handler::block))
        .route("/{id}/unblock", put(handler::unblock))
}
