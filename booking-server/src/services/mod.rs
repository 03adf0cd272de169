//! 服务模块
//!
//! - [`CatalogService`] - 服务者的服务项目与款式 (带内存缓存)
//! - [`AuditListener`] - 订单事件审计监听器

pub mod catalog_service;
pub mod notification;

pub use catalog_service::{CatalogService, ServiceCatalog};
pub use notification::AuditListener;
