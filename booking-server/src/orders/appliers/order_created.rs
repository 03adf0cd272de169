//! OrderCreated event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, Order, OrderEvent, OrderStatus};

pub struct OrderCreatedApplier;

impl EventApplier for OrderCreatedApplier {
    fn apply(&self, order: &mut Order, event: &OrderEvent) {
        if let EventPayload::OrderCreated {
            client_id,
            provider_id,
            service_id,
            design_id,
            slot_id,
            requested_date_time,
            price,
            respond_by_deadline,
        } = &event.payload
        {
            order.id = event.order_id.clone();
            order.client_id = client_id.clone();
            order.provider_id = provider_id.clone();
            order.service_id = service_id.clone();
            order.design_id = design_id.clone();
            order.slot_id = slot_id.clone();
            order.requested_date_time = *requested_date_time;
            order.price = *price;
            order.respond_by_deadline = *respond_by_deadline;
            order.status = OrderStatus::Pending;
            order.created_at = event.timestamp;

            super::touch(order, event);
        }
    }
}
