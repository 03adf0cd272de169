//! OrdersManager - command processing for the order state machine
//!
//! This module handles:
//! - Authorization of the actor against the order's parties
//! - Lazy timeout of orders whose response deadline has passed
//! - Command execution inside one redb write transaction
//! - Folding events into the order record and persisting both
//! - Event broadcasting after commit
//!
//! # Command Flow
//!
//! ```text
//! execute_command(cmd)
//!     ├─ 1. Begin write transaction
//!     ├─ 2. Load order, authorize actor
//!     ├─ 3. Legal but past the deadline? → commit timeout, broadcast, reject
//!     ├─ 4. Convert command to action and execute
//!     ├─ 5. Apply events to the order via EventApplier
//!     ├─ 6. Persist events, order and resolver index
//!     ├─ 7. Commit transaction
//!     ├─ 8. Broadcast event(s)
//!     └─ 9. Return the updated order
//! ```
//!
//! A failed command drops the transaction: order, slots and event log stay
//! exactly as they were.

mod error;
pub use error::*;

use super::actions::{
    AcceptProposedTimeAction, AutoCompleteOrderAction, CancelOrderAction, CommandAction,
    CompleteOrderAction, ConfirmOrderAction, CreateOrderAction, DeclineOrderAction,
    DeclineProposedTimeAction, ExpireOrderAction, ProposeTimeAction,
};
use super::appliers::EventAction;
use super::traits::{CommandContext, CommandHandler, CommandMetadata, EventApplier, OrderError};
use crate::core::OrderPolicy;
use crate::db::{BookingStorage, StorageError};
use crate::services::ServiceCatalog;
use crate::slots::SlotRegistry;
use redb::WriteTransaction;
use shared::order::{
    Actor, ActorRole, Order, OrderAction, OrderCommand, OrderCommandPayload, OrderEvent,
    OrderStatus, Party,
};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Result of one processed command
enum Outcome {
    Applied(Order, Vec<OrderEvent>),
    /// Deadline had passed: the order was timed out instead of running `action`
    Expired {
        order_id: String,
        action: OrderAction,
        events: Vec<OrderEvent>,
    },
}

/// OrdersManager for command processing
pub struct OrdersManager {
    storage: BookingStorage,
    slots: SlotRegistry,
    catalog: Arc<dyn ServiceCatalog>,
    policy: OrderPolicy,
    event_tx: broadcast::Sender<OrderEvent>,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &"<BookingStorage>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("policy", &self.policy)
            .finish()
    }
}

impl OrdersManager {
    pub fn new(
        storage: BookingStorage,
        slots: SlotRegistry,
        catalog: Arc<dyn ServiceCatalog>,
        policy: OrderPolicy,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            storage,
            slots,
            catalog,
            policy,
            event_tx,
        }
    }

    /// Subscribe to event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.event_tx.subscribe()
    }

    /// Get the underlying storage
    pub fn storage(&self) -> &BookingStorage {
        &self.storage
    }

    pub fn policy(&self) -> &OrderPolicy {
        &self.policy
    }

    // ========== Commands ==========

    /// Execute a command at the current wall-clock time
    pub fn execute_command(&self, cmd: OrderCommand) -> ManagerResult<Order> {
        self.execute_command_at(cmd, shared::util::now_millis())
    }

    /// Execute a command with an explicit engine clock
    ///
    /// Every deadline comparison of the command uses `now`.
    pub fn execute_command_at(&self, cmd: OrderCommand, now: i64) -> ManagerResult<Order> {
        match self.process_command(&cmd, now)? {
            Outcome::Applied(order, events) => {
                self.broadcast(events);
                Ok(order)
            }
            Outcome::Expired {
                order_id,
                action,
                events,
            } => {
                tracing::info!(
                    order_id = %order_id,
                    action = %action,
                    actor_id = %cmd.actor.id,
                    "Order timed out on access"
                );
                self.broadcast(events);
                Err(ManagerError::DeadlineElapsed { order_id, action })
            }
        }
    }

    fn broadcast(&self, events: Vec<OrderEvent>) {
        for event in events {
            if self.event_tx.send(event).is_err() {
                tracing::warn!("Event broadcast failed: no active receivers");
                break;
            }
        }
    }

    fn process_command(&self, cmd: &OrderCommand, now: i64) -> ManagerResult<Outcome> {
        tracing::debug!(command_id = %cmd.command_id, payload = ?cmd.payload, "Processing command");

        // 1. Begin write transaction
        let txn = self.storage.begin_write()?;

        let metadata = CommandMetadata {
            command_id: cmd.command_id.clone(),
            actor: cmd.actor.clone(),
            timestamp: now,
        };

        // 2. Authorization (and lazy timeout for orders awaiting an answer)
        let order_id = match (cmd.payload.order_id(), cmd.payload.action()) {
            (Some(order_id), Some(action)) => {
                let order = self
                    .storage
                    .get_order_txn(&txn, order_id)?
                    .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;
                authorize(&cmd.actor, &order, action)?;

                // Only a request the table would accept times the order out
                if action.is_deadline_bound()
                    && order.status.next(action).is_some()
                    && order.is_overdue(now)
                {
                    let expire = CommandAction::ExpireOrder(ExpireOrderAction {
                        order_id: order.id.clone(),
                    });
                    let system = CommandMetadata {
                        actor: Actor::system(),
                        ..metadata
                    };
                    let (_, events) = self.apply(&txn, &expire, &system, &order.id)?;
                    txn.commit().map_err(StorageError::from)?;
                    return Ok(Outcome::Expired {
                        order_id: order.id,
                        action,
                        events,
                    });
                }
                order.id
            }
            _ => {
                if cmd.actor.role != ActorRole::Client {
                    return Err(ManagerError::PermissionDenied(format!(
                        "Only clients can create orders, actor {} is a {}",
                        cmd.actor.id, cmd.actor.role
                    )));
                }
                shared::util::new_id()
            }
        };

        // 3. Convert to action and execute
        let action = to_action(&cmd.payload, &order_id);
        let (order, events) = self.apply(&txn, &action, &metadata, &order_id)?;

        // 4. Commit
        txn.commit().map_err(StorageError::from)?;

        tracing::debug!(
            order_id = %order.id,
            status = %order.status,
            version = order.version,
            "Command applied"
        );
        Ok(Outcome::Applied(order, events))
    }

    /// Execute `action`, fold its events and persist everything in `txn`
    fn apply(
        &self,
        txn: &WriteTransaction,
        action: &CommandAction,
        metadata: &CommandMetadata,
        order_id: &str,
    ) -> ManagerResult<(Order, Vec<OrderEvent>)> {
        let events = {
            let mut ctx = CommandContext::new(
                txn,
                &self.storage,
                &self.slots,
                self.catalog.as_ref(),
                &self.policy,
            );
            action.execute(&mut ctx, metadata)?
        };

        let mut order = self
            .storage
            .get_order_txn(txn, order_id)?
            .unwrap_or_else(|| Order::new(order_id));
        for event in &events {
            EventAction::from(event).apply(&mut order, event);
            self.storage.store_event(txn, event)?;
        }
        self.storage
            .put_order(txn, &order, order.due_at(self.policy.auto_complete_grace_ms))?;

        Ok((order, events))
    }

    // ========== Queries ==========

    /// Get an order by ID
    pub fn get_order(&self, order_id: &str) -> ManagerResult<Option<Order>> {
        Ok(self.storage.get_order(order_id)?)
    }

    /// Get an order the actor takes part in
    pub fn get_order_for(&self, actor: &Actor, order_id: &str) -> ManagerResult<Order> {
        let order = self
            .storage
            .get_order(order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;
        if !order.involves(&actor.id) {
            return Err(ManagerError::PermissionDenied(format!(
                "Actor {} is not a party of order {}",
                actor.id, order_id
            )));
        }
        Ok(order)
    }

    /// Orders where the actor is client or provider, newest first
    pub fn list_orders(
        &self,
        actor_id: &str,
        status: Option<OrderStatus>,
    ) -> ManagerResult<Vec<Order>> {
        let mut orders = self.storage.list_orders_for_party(actor_id)?;
        if let Some(status) = status {
            orders.retain(|o| o.status == status);
        }
        Ok(orders)
    }

    /// Event history of an order the actor takes part in
    pub fn get_events(&self, actor: &Actor, order_id: &str) -> ManagerResult<Vec<OrderEvent>> {
        self.get_order_for(actor, order_id)?;
        Ok(self.storage.get_events_for_order(order_id)?)
    }
}

/// Check the actor is the party `action` belongs to
fn authorize(actor: &Actor, order: &Order, action: OrderAction) -> ManagerResult<()> {
    let allowed = match action.party() {
        Party::Client => actor.role == ActorRole::Client && order.client_id == actor.id,
        Party::Provider => actor.role == ActorRole::Provider && order.provider_id == actor.id,
        Party::System => actor.is_system(),
    };
    if allowed {
        Ok(())
    } else {
        Err(ManagerError::PermissionDenied(format!(
            "Actor {} ({}) may not {} order {}",
            actor.id, actor.role, action, order.id
        )))
    }
}

fn to_action(payload: &OrderCommandPayload, order_id: &str) -> CommandAction {
    let order_id = order_id.to_string();
    match payload {
        OrderCommandPayload::CreateOrder {
            provider_id,
            service_id,
            slot_id,
            design_id,
        } => CommandAction::CreateOrder(CreateOrderAction {
            order_id,
            provider_id: provider_id.clone(),
            service_id: service_id.clone(),
            slot_id: slot_id.clone(),
            design_id: design_id.clone(),
        }),
        OrderCommandPayload::ConfirmOrder { .. } => {
            CommandAction::ConfirmOrder(ConfirmOrderAction { order_id })
        }
        OrderCommandPayload::DeclineOrder { reason, .. } => {
            CommandAction::DeclineOrder(DeclineOrderAction {
                order_id,
                reason: reason.clone(),
            })
        }
        OrderCommandPayload::ProposeTime { new_slot_id, .. } => {
            CommandAction::ProposeTime(ProposeTimeAction {
                order_id,
                new_slot_id: new_slot_id.clone(),
            })
        }
        OrderCommandPayload::AcceptProposedTime { .. } => {
            CommandAction::AcceptProposedTime(AcceptProposedTimeAction { order_id })
        }
        OrderCommandPayload::DeclineProposedTime { .. } => {
            CommandAction::DeclineProposedTime(DeclineProposedTimeAction { order_id })
        }
        OrderCommandPayload::CancelOrder { .. } => {
            CommandAction::CancelOrder(CancelOrderAction { order_id })
        }
        OrderCommandPayload::CompleteOrder { rating, .. } => {
            CommandAction::CompleteOrder(CompleteOrderAction {
                order_id,
                rating: *rating,
            })
        }
        OrderCommandPayload::ExpireOrder { .. } => {
            CommandAction::ExpireOrder(ExpireOrderAction { order_id })
        }
        OrderCommandPayload::AutoCompleteOrder { .. } => {
            CommandAction::AutoCompleteOrder(AutoCompleteOrderAction { order_id })
        }
    }
}

#[cfg(test)]
mod tests;
