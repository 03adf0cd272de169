//! TimeProposed event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, Order, OrderEvent, OrderStatus};

pub struct TimeProposedApplier;

impl EventApplier for TimeProposedApplier {
    fn apply(&self, order: &mut Order, event: &OrderEvent) {
        if let EventPayload::TimeProposed {
            slot_id,
            proposed_date_time,
            respond_by_deadline,
            ..
        } = &event.payload
        {
            order.status = OrderStatus::AlternativeProposed;
            order.slot_id = slot_id.clone();
            order.proposed_date_time = Some(*proposed_date_time);
            // the client now has its own answer window
            order.respond_by_deadline = *respond_by_deadline;

            super::touch(order, event);
        }
    }
}
