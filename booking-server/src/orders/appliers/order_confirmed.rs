//! OrderConfirmed / ProposalAccepted event applier
//!
//! Both end in `confirmed`; `confirmed_date_time` is set exactly once.

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, Order, OrderEvent, OrderStatus};

pub struct OrderConfirmedApplier;

impl EventApplier for OrderConfirmedApplier {
    fn apply(&self, order: &mut Order, event: &OrderEvent) {
        let (slot_id, confirmed_at) = match &event.payload {
            EventPayload::OrderConfirmed {
                slot_id,
                confirmed_date_time,
            }
            | EventPayload::ProposalAccepted {
                slot_id,
                confirmed_date_time,
            } => (slot_id, *confirmed_date_time),
            _ => return,
        };

        order.status = OrderStatus::Confirmed;
        order.slot_id = slot_id.clone();
        if order.confirmed_date_time.is_none() {
            order.confirmed_date_time = Some(confirmed_at);
        }

        super::touch(order, event);
    }
}
