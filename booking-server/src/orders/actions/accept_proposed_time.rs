//! AcceptProposedTime command handler
//!
//! Client takes the provider's alternative. The proposed slot is re-checked:
//! if it is no longer held by this order the accept fails with
//! `SlotConflict` and nothing changes.

use shared::order::{EventPayload, OrderAction, OrderEvent};

use crate::orders::traits::{
    CommandContext, CommandHandler, CommandMetadata, OrderError, ensure_transition,
};
use crate::slots::SlotError;

/// AcceptProposedTime action
#[derive(Debug, Clone)]
pub struct AcceptProposedTimeAction {
    pub order_id: String,
}

impl CommandHandler for AcceptProposedTimeAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Load existing order and validate transition
        let order = ctx.load_order(&self.order_id)?;
        ensure_transition(&order, OrderAction::AcceptProposal)?;

        // 2. Re-validate the hold
        let slot = ctx
            .storage
            .get_slot_txn(ctx.txn, &order.slot_id)?
            .ok_or_else(|| SlotError::NotFound(order.slot_id.clone()))?;
        if !slot.is_held_by(&order.id) {
            return Err(SlotError::Conflict(slot.id).into());
        }

        // 3. Book it
        ctx.slots
            .commit_in(ctx.txn, &order.slot_id, &order.id, metadata.timestamp)?;

        // 4. Create event
        let event = super::next_event(
            &order,
            metadata,
            EventPayload::ProposalAccepted {
                slot_id: order.slot_id.clone(),
                confirmed_date_time: order.proposed_date_time.unwrap_or(slot.starts_at),
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::{ProposeTimeAction, fixtures::*};
    use shared::order::{Actor, OrderStatus};
    use shared::schedule::SlotStatus;

    #[test]
    fn test_accept_confirms_proposed_time() {
        let fx = Fixture::new();
        let (order, _) = fx.pending_order(10);
        let new = fx.slot(14);
        fx.run(
            &ProposeTimeAction {
                order_id: order.id.clone(),
                new_slot_id: new.id.clone(),
            },
            &order.id,
            Actor::provider(PROVIDER),
            NOW + 1,
        )
        .unwrap();

        fx.run(
            &AcceptProposedTimeAction {
                order_id: order.id.clone(),
            },
            &order.id,
            Actor::client(CLIENT),
            NOW + 2,
        )
        .unwrap();

        let order = fx.order(&order.id);
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.confirmed_date_time, Some(new.starts_at));
        assert!(fx.slots.get(&new.id).unwrap().is_booked_by(&order.id));
        assert_eq!(fx.slots.get(&new.id).unwrap().status, SlotStatus::Booked);
    }

    #[test]
    fn test_accept_on_pending_is_invalid() {
        let fx = Fixture::new();
        let (order, _) = fx.pending_order(10);
        assert!(matches!(
            fx.run(
                &AcceptProposedTimeAction {
                    order_id: order.id.clone()
                },
                &order.id,
                Actor::client(CLIENT),
                NOW + 1
            ),
            Err(OrderError::InvalidTransition { .. })
        ));
    }
}
