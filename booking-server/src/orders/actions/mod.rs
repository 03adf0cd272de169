//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles one
//! command type. Every action on an existing order consults the transition
//! table first, then applies its slot effect inside the same transaction,
//! then emits exactly one event.

use shared::order::{EventPayload, Order, OrderEvent};
use shared::schedule::TimeSlot;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use crate::slots::SlotError;

mod accept_proposed_time;
mod cancel_order;
mod complete_order;
mod confirm_order;
mod create_order;
mod decline_order;
mod decline_proposed_time;
mod expire_order;
mod propose_time;

pub use accept_proposed_time::AcceptProposedTimeAction;
pub use cancel_order::CancelOrderAction;
pub use complete_order::{AutoCompleteOrderAction, CompleteOrderAction};
pub use confirm_order::ConfirmOrderAction;
pub use create_order::CreateOrderAction;
pub use decline_order::DeclineOrderAction;
pub use decline_proposed_time::DeclineProposedTimeAction;
pub use expire_order::ExpireOrderAction;
pub use propose_time::ProposeTimeAction;

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    CreateOrder(CreateOrderAction),
    ConfirmOrder(ConfirmOrderAction),
    DeclineOrder(DeclineOrderAction),
    ProposeTime(ProposeTimeAction),
    AcceptProposedTime(AcceptProposedTimeAction),
    DeclineProposedTime(DeclineProposedTimeAction),
    CancelOrder(CancelOrderAction),
    CompleteOrder(CompleteOrderAction),
    AutoCompleteOrder(AutoCompleteOrderAction),
    ExpireOrder(ExpireOrderAction),
}

/// Manual implementation of CommandHandler for CommandAction
impl CommandHandler for CommandAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        match self {
            CommandAction::CreateOrder(a) => a.execute(ctx, metadata),
            CommandAction::ConfirmOrder(a) => a.execute(ctx, metadata),
            CommandAction::DeclineOrder(a) => a.execute(ctx, metadata),
            CommandAction::ProposeTime(a) => a.execute(ctx, metadata),
            CommandAction::AcceptProposedTime(a) => a.execute(ctx, metadata),
            CommandAction::DeclineProposedTime(a) => a.execute(ctx, metadata),
            CommandAction::CancelOrder(a) => a.execute(ctx, metadata),
            CommandAction::CompleteOrder(a) => a.execute(ctx, metadata),
            CommandAction::AutoCompleteOrder(a) => a.execute(ctx, metadata),
            CommandAction::ExpireOrder(a) => a.execute(ctx, metadata),
        }
    }
}

/// Next event in the order's stream
fn next_event(order: &Order, metadata: &CommandMetadata, payload: EventPayload) -> OrderEvent {
    OrderEvent::new(
        order.version + 1,
        order.id.clone(),
        &metadata.actor,
        metadata.command_id.clone(),
        metadata.timestamp,
        payload,
    )
}

/// Load a slot an order wants to move into and check it fits
///
/// The slot must belong to `provider_id`, start after `now` and be at least
/// `min_minutes` long. Availability itself is decided by the claim.
fn bookable_slot(
    ctx: &CommandContext<'_>,
    slot_id: &str,
    provider_id: &str,
    min_minutes: Option<u32>,
    now: i64,
) -> Result<TimeSlot, OrderError> {
    let slot = ctx
        .storage
        .get_slot_txn(ctx.txn, slot_id)?
        .ok_or_else(|| SlotError::NotFound(slot_id.to_string()))?;

    if slot.provider_id != provider_id {
        return Err(OrderError::Validation(format!(
            "Slot {} does not belong to provider {}",
            slot_id, provider_id
        )));
    }
    if slot.starts_at <= now {
        return Err(SlotError::InPast.into());
    }
    if let Some(required) = min_minutes
        && slot.duration_minutes() < i64::from(required)
    {
        return Err(OrderError::SlotTooShort {
            slot_id: slot_id.to_string(),
            required_minutes: required,
        });
    }
    Ok(slot)
}
