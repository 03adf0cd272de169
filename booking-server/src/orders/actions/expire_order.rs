//! ExpireOrder command handler
//!
//! Issued by the timeout resolver (or lazily by the manager) once
//! `respond_by_deadline` has passed on a pending or proposed order.
//! The held slot goes back to `available`.

use shared::order::{EventPayload, OrderAction, OrderEvent};

use crate::orders::traits::{
    CommandContext, CommandHandler, CommandMetadata, OrderError, ensure_transition,
};

/// ExpireOrder action
#[derive(Debug, Clone)]
pub struct ExpireOrderAction {
    pub order_id: String,
}

impl CommandHandler for ExpireOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let now = metadata.timestamp;

        let order = ctx.load_order(&self.order_id)?;
        ensure_transition(&order, OrderAction::Expire)?;

        if order.respond_by_deadline > now {
            return Err(OrderError::PreconditionFailed {
                order_id: order.id.clone(),
                action: OrderAction::Expire,
                reason: "response deadline not reached".to_string(),
            });
        }

        ctx.slots.release_in(ctx.txn, &order.slot_id, &order.id, now)?;

        let event = super::next_event(
            &order,
            metadata,
            EventPayload::OrderTimedOut {
                slot_id: order.slot_id.clone(),
                deadline: order.respond_by_deadline,
            },
        );
        Ok(vec![event])
    }
}
