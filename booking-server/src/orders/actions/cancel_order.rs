//! CancelOrder command handler
//!
//! Client cancels a confirmed appointment before it starts; the booked slot
//! becomes available again.

use shared::order::{EventPayload, OrderAction, OrderEvent};

use crate::orders::traits::{
    CommandContext, CommandHandler, CommandMetadata, OrderError, ensure_transition,
};

/// CancelOrder action
#[derive(Debug, Clone)]
pub struct CancelOrderAction {
    pub order_id: String,
}

impl CommandHandler for CancelOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let now = metadata.timestamp;

        // 1. Load existing order and validate transition
        let order = ctx.load_order(&self.order_id)?;
        ensure_transition(&order, OrderAction::Cancel)?;

        // 2. Only before the appointment
        if order.confirmed_date_time.is_some_and(|at| at <= now) {
            return Err(OrderError::PreconditionFailed {
                order_id: order.id.clone(),
                action: OrderAction::Cancel,
                reason: "appointment time has passed".to_string(),
            });
        }

        // 3. booked → available
        ctx.slots
            .cancel_booking_in(ctx.txn, &order.slot_id, &order.id, now)?;

        let event = super::next_event(
            &order,
            metadata,
            EventPayload::OrderCancelled {
                slot_id: order.slot_id.clone(),
            },
        );
        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::fixtures::*;
    use shared::order::{Actor, OrderStatus};
    use shared::schedule::SlotStatus;

    fn cancel(order_id: &str) -> CancelOrderAction {
        CancelOrderAction {
            order_id: order_id.to_string(),
        }
    }

    #[test]
    fn test_cancel_confirmed_frees_slot() {
        let fx = Fixture::new();
        let (order, slot) = fx.confirmed_order(10);

        fx.run(&cancel(&order.id), &order.id, Actor::client(CLIENT), NOW + 5)
            .unwrap();

        assert_eq!(fx.order(&order.id).status, OrderStatus::Cancelled);
        let slot = fx.slots.get(&slot.id).unwrap();
        assert_eq!(slot.status, SlotStatus::Available);
        assert!(slot.order_id.is_none());
    }

    #[test]
    fn test_cancel_after_start_rejected() {
        let fx = Fixture::new();
        let (order, slot) = fx.confirmed_order(10);

        let err = fx
            .run(
                &cancel(&order.id),
                &order.id,
                Actor::client(CLIENT),
                slot.starts_at,
            )
            .unwrap_err();
        assert!(matches!(err, OrderError::PreconditionFailed { .. }));
        assert_eq!(fx.order(&order.id).status, OrderStatus::Confirmed);
    }

    #[test]
    fn test_cancel_pending_is_invalid() {
        let fx = Fixture::new();
        let (order, _) = fx.pending_order(10);
        assert!(matches!(
            fx.run(&cancel(&order.id), &order.id, Actor::client(CLIENT), NOW + 1),
            Err(OrderError::InvalidTransition { .. })
        ));
    }
}
