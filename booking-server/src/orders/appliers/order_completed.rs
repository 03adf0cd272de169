//! OrderCompleted event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, Order, OrderEvent, OrderStatus};

pub struct OrderCompletedApplier;

impl EventApplier for OrderCompletedApplier {
    fn apply(&self, order: &mut Order, event: &OrderEvent) {
        if let EventPayload::OrderCompleted {
            completed_by,
            rating,
        } = &event.payload
        {
            order.status = OrderStatus::Completed;
            order.completed_at = Some(event.timestamp);
            order.completed_by = Some(*completed_by);
            order.rating = *rating;

            super::touch(order, event);
        }
    }
}
