//! ConfirmOrder command handler
//!
//! Provider accepts the requested time: `held → booked`.

use shared::order::{EventPayload, OrderAction, OrderEvent};

use crate::orders::traits::{
    CommandContext, CommandHandler, CommandMetadata, OrderError, ensure_transition,
};

/// ConfirmOrder action
#[derive(Debug, Clone)]
pub struct ConfirmOrderAction {
    pub order_id: String,
}

impl CommandHandler for ConfirmOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Load existing order
        let order = ctx.load_order(&self.order_id)?;

        // 2. Validate transition
        ensure_transition(&order, OrderAction::Confirm)?;

        // 3. Book the held slot
        ctx.slots
            .commit_in(ctx.txn, &order.slot_id, &order.id, metadata.timestamp)?;

        // 4. Create event
        let event = super::next_event(
            &order,
            metadata,
            EventPayload::OrderConfirmed {
                slot_id: order.slot_id.clone(),
                confirmed_date_time: order.requested_date_time,
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

    #[test]
    fn test_confirm_books_slot() {
        let fx = Fixture::new();
        let (order, slot) = fx.pending_order(10);

        let action = ConfirmOrderAction {
            order_id: order.id.clone(),
        };
        fx.run(&action, &order.id, Actor::provider(PROVIDER), NOW + 1)
            .unwrap();

        let order = fx.order(&order.id);
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.confirmed_date_time, Some(slot.starts_at));
        assert_eq!(order.version, 2);
        assert_eq!(fx.slots.get(&slot.id).unwrap().status, SlotStatus::Booked);
    }

    #[test]
    fn test_confirm_twice_is_invalid() {
        let fx = Fixture::new();
        let (order, _) = fx.confirmed_order(10);
        let action = ConfirmOrderAction {
            order_id: order.id.clone(),
        };
        let err = fx
            .run(&action, &order.id, Actor::provider(PROVIDER), NOW + 2)
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::InvalidTransition {
                status: OrderStatus::Confirmed,
                ..
            }
        ));
    }

    #[test]
    fn test_confirm_unknown_order() {
        let fx = Fixture::new();
        let action = ConfirmOrderAction {
            order_id: "nope".into(),
        };
        assert!(matches!(
            fx.run(&action, "nope", Actor::provider(PROVIDER), NOW),
            Err(OrderError::OrderNotFound(_))
        ));
    }
}
