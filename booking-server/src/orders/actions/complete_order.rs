//! CompleteOrder / AutoCompleteOrder command handlers
//!
//! | Command             | Actor    | Guard                              |
//! |---------------------|----------|------------------------------------|
//! | `CompleteOrder`     | provider | optional rating 1..=5              |
//! | `AutoCompleteOrder` | system   | appointment time has been reached  |
//!
//! Both keep the slot `booked` and drop its order reference.

use shared::order::{CompletedBy, EventPayload, OrderAction, OrderEvent};

use crate::orders::traits::{
    CommandContext, CommandHandler, CommandMetadata, OrderError, ensure_transition,
};

/// CompleteOrder action (provider marks the appointment done)
#[derive(Debug, Clone)]
pub struct CompleteOrderAction {
    pub order_id: String,
    pub rating: Option<u8>,
}

impl CommandHandler for CompleteOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let order = ctx.load_order(&self.order_id)?;
        ensure_transition(&order, OrderAction::Complete)?;

        if let Some(rating) = self.rating
            && !(1..=5).contains(&rating)
        {
            return Err(OrderError::InvalidRating(rating));
        }

        ctx.slots
            .finish_booking_in(ctx.txn, &order.slot_id, &order.id, metadata.timestamp)?;

        let event = super::next_event(
            &order,
            metadata,
            EventPayload::OrderCompleted {
                completed_by: CompletedBy::Master,
                rating: self.rating,
            },
        );
        Ok(vec![event])
    }
}

/// AutoCompleteOrder action (resolver closes a confirmed order after its time)
#[derive(Debug, Clone)]
pub struct AutoCompleteOrderAction {
    pub order_id: String,
}

impl CommandHandler for AutoCompleteOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let now = metadata.timestamp;

        let order = ctx.load_order(&self.order_id)?;
        ensure_transition(&order, OrderAction::AutoComplete)?;

        if !order.confirmed_date_time.is_some_and(|at| at <= now) {
            return Err(OrderError::PreconditionFailed {
                order_id: order.id.clone(),
                action: OrderAction::AutoComplete,
                reason: "appointment time not reached".to_string(),
            });
        }

        ctx.slots
            .finish_booking_in(ctx.txn, &order.slot_id, &order.id, now)?;

        let event = super::next_event(
            &order,
            metadata,
            EventPayload::OrderCompleted {
                completed_by: CompletedBy::Auto,
                rating: None,
            },
        );
        Ok(vec![event])
    }
}
