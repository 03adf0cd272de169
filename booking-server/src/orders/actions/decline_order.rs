//! DeclineOrder command handler
//!
//! Provider rejects a pending order; the slot goes back to `available`.

use shared::order::{EventPayload, OrderAction, OrderEvent};

use crate::orders::traits::{
    CommandContext, CommandHandler, CommandMetadata, OrderError, ensure_transition,
};
use crate::utils::validation::MAX_NOTE_LEN;

/// DeclineOrder action
#[derive(Debug, Clone)]
pub struct DeclineOrderAction {
    pub order_id: String,
    pub reason: Option<String>,
}

impl CommandHandler for DeclineOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if let Some(reason) = &self.reason
            && reason.len() > MAX_NOTE_LEN
        {
            return Err(OrderError::Validation(format!(
                "reason is too long ({} chars, max {MAX_NOTE_LEN})",
                reason.len()
            )));
        }

        let order = ctx.load_order(&self.order_id)?;
        ensure_transition(&order, OrderAction::Decline)?;

        ctx.slots
            .release_in(ctx.txn, &order.slot_id, &order.id, metadata.timestamp)?;

        let event = super::next_event(
            &order,
            metadata,
            EventPayload::OrderDeclined {
                reason: self.reason.clone(),
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
    fn test_decline_releases_slot() {
        let fx = Fixture::new();
        let (order, slot) = fx.pending_order(10);

        let action = DeclineOrderAction {
            order_id: order.id.clone(),
            reason: Some("On holiday".into()),
        };
        fx.run(&action, &order.id, Actor::provider(PROVIDER), NOW + 1)
            .unwrap();

        let order = fx.order(&order.id);
        assert_eq!(order.status, OrderStatus::Declined);
        assert_eq!(order.decline_reason.as_deref(), Some("On holiday"));
        let slot = fx.slots.get(&slot.id).unwrap();
        assert_eq!(slot.status, SlotStatus::Available);
        assert!(slot.order_id.is_none());
    }

    #[test]
    fn test_decline_confirmed_is_invalid() {
        let fx = Fixture::new();
        let (order, slot) = fx.confirmed_order(10);
        let action = DeclineOrderAction {
            order_id: order.id.clone(),
            reason: None,
        };
        assert!(matches!(
            fx.run(&action, &order.id, Actor::provider(PROVIDER), NOW + 2),
            Err(OrderError::InvalidTransition { .. })
        ));
        assert_eq!(fx.slots.get(&slot.id).unwrap().status, SlotStatus::Booked);
    }

    #[test]
    fn test_decline_reason_too_long() {
        let fx = Fixture::new();
        let (order, _) = fx.pending_order(10);
        let action = DeclineOrderAction {
            order_id: order.id.clone(),
            reason: Some("x".repeat(MAX_NOTE_LEN + 1)),
        };
        assert!(matches!(
            fx.run(&action, &order.id, Actor::provider(PROVIDER), NOW + 1),
            Err(OrderError::Validation(_))
        ));
        assert_eq!(fx.order(&order.id).status, OrderStatus::Pending);
    }
}
