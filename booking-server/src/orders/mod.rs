//! Order state machine
//!
//! - **manager**: OrdersManager, command processing and event broadcasting
//! - **actions**: one `CommandHandler` per command (state check + slot effect)
//! - **appliers**: one `EventApplier` per event family (pure fold)
//! - **timeout_resolver**: periodic scan that times out or auto-completes due orders
//!
//! # Architecture
//!
//! ```text
//! Command → OrdersManager → Action ──→ SlotRegistry (same txn)
//!                 ↓            ↓
//!                 ↓          Event → Applier → Order
//!                 ↓                              ↓
//!              Broadcast ←──────── commit ── redb
//!                 ↓
//!           Audit listener
//! ```

pub mod actions;
pub mod appliers;
pub mod manager;
pub mod timeout_resolver;
pub mod traits;

// Re-exports
pub use manager::{ManagerError, ManagerResult, OrdersManager};
pub use timeout_resolver::{ResolveReport, TimeoutResolver, resolve_due};
pub use traits::OrderError;

pub use shared::order::{
    EventPayload, Order, OrderCommand, OrderCommandPayload, OrderEvent, OrderEventType,
    OrderStatus,
};
