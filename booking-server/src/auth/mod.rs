//! 身份认证模块
//!
//! 身份由外部身份服务签发，本服务只校验 JWT 并提取当前参与者：
//! - [`JwtService`] - JWT 令牌校验 (及测试/工具用的签发)
//! - [`CurrentActor`] - 当前参与者 (id + 角色)，axum extractor

pub mod extractor;
pub mod jwt;

pub use jwt::{Claims, CurrentActor, JwtConfig, JwtError, JwtService};
