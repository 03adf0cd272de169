//! Applier for the events that close an order without completing it
//!
//! | Event | Status |
//! |-------|--------|
//! | `OrderDeclined` | `declined` |
//! | `ProposalDeclined` | `cancelled` |
//! | `OrderCancelled` | `cancelled` |
//! | `OrderTimedOut` | `timeout` |

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, Order, OrderEvent, OrderStatus};

pub struct OrderClosedApplier;

impl EventApplier for OrderClosedApplier {
    fn apply(&self, order: &mut Order, event: &OrderEvent) {
        let status = match &event.payload {
            EventPayload::OrderDeclined { reason } => {
                order.decline_reason = reason.clone();
                OrderStatus::Declined
            }
            EventPayload::ProposalDeclined { .. } | EventPayload::OrderCancelled { .. } => {
                OrderStatus::Cancelled
            }
            EventPayload::OrderTimedOut { .. } => OrderStatus::Timeout,
            _ => return,
        };

        order.status = status;
        super::touch(order, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::Actor;

    #[test]
    fn test_decline_keeps_reason() {
        let mut order = Order::new("o-1");
        let event = OrderEvent::new(
            2,
            "o-1".into(),
            &Actor::provider("p-1"),
            "cmd".into(),
            7,
            EventPayload::OrderDeclined {
                reason: Some("fully booked".into()),
            },
        );
        OrderClosedApplier.apply(&mut order, &event);
        assert_eq!(order.status, OrderStatus::Declined);
        assert_eq!(order.decline_reason.as_deref(), Some("fully booked"));
        assert_eq!(order.updated_at, 7);
    }

    #[test]
    fn test_ignores_unrelated_payload() {
        let mut order = Order::new("o-1");
        let event = OrderEvent::new(
            2,
            "o-1".into(),
            &Actor::provider("p-1"),
            "cmd".into(),
            7,
            EventPayload::OrderConfirmed {
                slot_id: "s".into(),
                confirmed_date_time: 1,
            },
        );
        OrderClosedApplier.apply(&mut order, &event);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.version, 0);
    }
}
