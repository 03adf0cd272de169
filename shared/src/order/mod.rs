//! Order lifecycle types
//!
//! - Commands: requests from clients/providers/the resolver to change an order
//! - Events: immutable facts recorded after command processing
//! - Snapshot: the [`Order`] record folded from its event stream
//! - Lifecycle: the transition table every command is checked against

pub mod command;
pub mod event;
pub mod lifecycle;
pub mod snapshot;
pub mod types;

// Re-exports
pub use command::{OrderCommand, OrderCommandPayload};
pub use event::{EventPayload, OrderEvent, OrderEventType};
pub use lifecycle::{OrderAction, Party};
pub use snapshot::{Order, OrderStatus};
pub use types::*;
