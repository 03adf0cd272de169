//! ProposeTime command handler
//!
//! Negotiation step, all inside the caller's transaction:
//!
//! 1. claim the new slot (on failure nothing else happens)
//! 2. release the old slot
//! 3. re-point the order and open the client's answer window
//!
//! A failed claim surfaces as `SlotConflict` and the transaction is dropped,
//! so the order keeps its original slot and stays `pending`.

use shared::order::{EventPayload, OrderAction, OrderEvent};

use super::bookable_slot;
use crate::orders::traits::{
    CommandContext, CommandHandler, CommandMetadata, OrderError, ensure_transition,
};

/// ProposeTime action
#[derive(Debug, Clone)]
pub struct ProposeTimeAction {
    pub order_id: String,
    pub new_slot_id: String,
}

impl CommandHandler for ProposeTimeAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let now = metadata.timestamp;

        // 1. Load existing order and validate transition
        let order = ctx.load_order(&self.order_id)?;
        ensure_transition(&order, OrderAction::ProposeTime)?;

        if self.new_slot_id == order.slot_id {
            return Err(OrderError::Validation(
                "Proposed slot is the slot already requested".to_string(),
            ));
        }

        // 2. New slot must belong to the same provider and fit the service
        let min_minutes = ctx
            .catalog
            .service(&order.service_id)
            .map(|s| s.duration_minutes);
        bookable_slot(ctx, &self.new_slot_id, &order.provider_id, min_minutes, now)?;

        // 3. Claim new, then release old
        let token = ctx
            .slots
            .claim_in(ctx.txn, &self.new_slot_id, &order.id, now)?;
        ctx.slots.release_in(ctx.txn, &order.slot_id, &order.id, now)?;

        // The client must answer before the proposed appointment starts
        let respond_by_deadline =
            (now + ctx.policy.proposal_response_window_ms).min(token.starts_at);

        // 4. Create event
        let event = super::next_event(
            &order,
            metadata,
            EventPayload::TimeProposed {
                previous_slot_id: order.slot_id.clone(),
                slot_id: token.slot_id,
                proposed_date_time: token.starts_at,
                respond_by_deadline,
            },
        );

        Ok(vec![event])
    }
}
