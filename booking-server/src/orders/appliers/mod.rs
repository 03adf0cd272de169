//! Event applier implementations
//!
//! Each applier implements the `EventApplier` trait for one family of
//! events. Appliers are PURE functions: the order record is exactly the
//! fold of its event stream.

use shared::order::{EventPayload, Order, OrderEvent};

use crate::orders::traits::EventApplier;

mod order_closed;
mod order_completed;
mod order_confirmed;
mod order_created;
mod time_proposed;

pub use order_closed::OrderClosedApplier;
pub use order_completed::OrderCompletedApplier;
pub use order_confirmed::OrderConfirmedApplier;
pub use order_created::OrderCreatedApplier;
pub use time_proposed::TimeProposedApplier;

/// EventAction enum - dispatches to concrete applier implementations
pub enum EventAction {
    OrderCreated(OrderCreatedApplier),
    OrderConfirmed(OrderConfirmedApplier),
    TimeProposed(TimeProposedApplier),
    OrderClosed(OrderClosedApplier),
    OrderCompleted(OrderCompletedApplier),
}

/// Convert OrderEvent reference to EventAction
///
/// This is the ONLY place with a match on EventPayload.
impl From<&OrderEvent> for EventAction {
    fn from(event: &OrderEvent) -> Self {
        match &event.payload {
            EventPayload::OrderCreated { .. } => EventAction::OrderCreated(OrderCreatedApplier),
            EventPayload::OrderConfirmed { .. } | EventPayload::ProposalAccepted { .. } => {
                EventAction::OrderConfirmed(OrderConfirmedApplier)
            }
            EventPayload::TimeProposed { .. } => EventAction::TimeProposed(TimeProposedApplier),
            EventPayload::OrderDeclined { .. }
            | EventPayload::ProposalDeclined { .. }
            | EventPayload::OrderCancelled { .. }
            | EventPayload::OrderTimedOut { .. } => EventAction::OrderClosed(OrderClosedApplier),
            EventPayload::OrderCompleted { .. } => {
                EventAction::OrderCompleted(OrderCompletedApplier)
            }
        }
    }
}

impl EventApplier for EventAction {
    fn apply(&self, order: &mut Order, event: &OrderEvent) {
        match self {
            EventAction::OrderCreated(a) => a.apply(order, event),
            EventAction::OrderConfirmed(a) => a.apply(order, event),
            EventAction::TimeProposed(a) => a.apply(order, event),
            EventAction::OrderClosed(a) => a.apply(order, event),
            EventAction::OrderCompleted(a) => a.apply(order, event),
        }
    }
}

/// Bookkeeping shared by every applier
fn touch(order: &mut Order, event: &OrderEvent) {
    order.version = event.sequence;
    order.updated_at = event.timestamp;
}

/// Rebuild an order from its full event stream
pub fn replay(order_id: &str, events: &[OrderEvent]) -> Order {
    let mut order = Order::new(order_id);
    for event in events {
        EventAction::from(event).apply(&mut order, event);
    }
    order
}
