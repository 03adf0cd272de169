//! Slot Registry - 时段可用性与占用
//!
//! 唯一写入 `slots` 表的模块 (订单状态机通过 `*_in` 事务变体调用)。

pub mod error;
pub mod registry;

pub use error::{SlotError, SlotResult};
pub use registry::{NewSlot, SlotRegistry};
