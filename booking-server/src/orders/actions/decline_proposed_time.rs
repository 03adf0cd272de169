//! DeclineProposedTime command handler
//!
//! Client rejects the alternative: the order is cancelled and the proposed
//! slot released.

use shared::order::{EventPayload, OrderAction, OrderEvent};

use crate::orders::traits::{
    CommandContext, CommandHandler, CommandMetadata, OrderError, ensure_transition,
};

/// DeclineProposedTime action
#[derive(Debug, Clone)]
pub struct DeclineProposedTimeAction {
    pub order_id: String,
}

impl CommandHandler for DeclineProposedTimeAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let order = ctx.load_order(&self.order_id)?;
        ensure_transition(&order, OrderAction::DeclineProposal)?;

        ctx.slots
            .release_in(ctx.txn, &order.slot_id, &order.id, metadata.timestamp)?;

        let event = super::next_event(
            &order,
            metadata,
            EventPayload::ProposalDeclined {
                slot_id: order.slot_id.clone(),
            },
        );
        Ok(vec![event])
    }
}
