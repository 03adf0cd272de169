//! Command handling contracts
//!
//! - [`CommandHandler`]: one implementation per command, produces events
//! - [`EventApplier`]: one implementation per event, folds it into the order
//! - [`CommandContext`]: the open write transaction plus the collaborators
//!   an action may touch (slot registry, catalog, timing policy)

use redb::WriteTransaction;
use shared::order::{Actor, Order, OrderAction, OrderEvent, OrderStatus};
use thiserror::Error;

use crate::core::OrderPolicy;
use crate::db::{BookingStorage, StorageError};
use crate::services::ServiceCatalog;
use crate::slots::{SlotError, SlotRegistry};

/// Action-level errors
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Cannot {action} order {order_id} in status {status}")]
    InvalidTransition {
        order_id: String,
        status: OrderStatus,
        action: OrderAction,
    },

    /// Table allows the transition but a time precondition does not hold
    #[error("Cannot {action} order {order_id}: {reason}")]
    PreconditionFailed {
        order_id: String,
        action: OrderAction,
        reason: String,
    },

    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    #[error("Design not found: {0}")]
    DesignNotFound(String),

    #[error("Slot {slot_id} is shorter than the {required_minutes} minutes the service needs")]
    SlotTooShort {
        slot_id: String,
        required_minutes: u32,
    },

    #[error("Rating must be between 1 and 5, got {0}")]
    InvalidRating(u8),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error(transparent)]
    Slot(#[from] SlotError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Identity and clock of the command being processed
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub actor: Actor,
    /// Engine time (Unix millis); every deadline comparison uses this value
    pub timestamp: i64,
}

/// Everything an action may read or write while the transaction is open
pub struct CommandContext<'a> {
    pub txn: &'a WriteTransaction,
    pub storage: &'a BookingStorage,
    pub slots: &'a SlotRegistry,
    pub catalog: &'a dyn ServiceCatalog,
    pub policy: &'a OrderPolicy,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        txn: &'a WriteTransaction,
        storage: &'a BookingStorage,
        slots: &'a SlotRegistry,
        catalog: &'a dyn ServiceCatalog,
        policy: &'a OrderPolicy,
    ) -> Self {
        Self {
            txn,
            storage,
            slots,
            catalog,
            policy,
        }
    }

    /// Load an order inside the open transaction
    pub fn load_order(&self, order_id: &str) -> Result<Order, OrderError> {
        self.storage
            .get_order_txn(self.txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }
}

/// Consult the transition table; every action calls this before touching slots
pub fn ensure_transition(order: &Order, action: OrderAction) -> Result<OrderStatus, OrderError> {
    order
        .status
        .next(action)
        .ok_or_else(|| OrderError::InvalidTransition {
            order_id: order.id.clone(),
            status: order.status,
            action,
        })
}

/// Command handler: validates and produces the events of one command
pub trait CommandHandler {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError>;
}

/// Event applier: pure fold of one event into the order record
pub trait EventApplier {
    fn apply(&self, order: &mut Order, event: &OrderEvent);
}
