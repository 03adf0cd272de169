//! CreateOrder command handler
//!
//! Claims the requested slot and opens a `pending` order with a price
//! snapshot of service + design.

use rust_decimal::Decimal;
use shared::order::{EventPayload, Order, OrderEvent};

use super::bookable_slot;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};

/// CreateOrder action
#[derive(Debug, Clone)]
pub struct CreateOrderAction {
    /// Pre-generated by the manager
    pub order_id: String,
    pub provider_id: String,
    pub service_id: String,
    pub slot_id: String,
    pub design_id: Option<String>,
}

impl CommandHandler for CreateOrderAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let now = metadata.timestamp;

        // 1. Catalog lookup
        let service = ctx
            .catalog
            .service(&self.service_id)
            .filter(|s| s.is_active)
            .ok_or_else(|| OrderError::ServiceNotFound(self.service_id.clone()))?;
        if service.provider_id != self.provider_id {
            return Err(OrderError::Validation(format!(
                "Service {} is not offered by provider {}",
                self.service_id, self.provider_id
            )));
        }

        let mut price: Decimal = service.price;
        if let Some(design_id) = &self.design_id {
            let design = ctx
                .catalog
                .design(design_id)
                .filter(|d| d.is_active)
                .ok_or_else(|| OrderError::DesignNotFound(design_id.clone()))?;
            if design.provider_id != self.provider_id {
                return Err(OrderError::Validation(format!(
                    "Design {} is not offered by provider {}",
                    design_id, self.provider_id
                )));
            }
            price = price.checked_add(design.price).ok_or_else(|| {
                OrderError::Validation(format!(
                    "Price of service {} with design {} is out of range",
                    self.service_id, design_id
                ))
            })?;
        }

        // 2. Slot must fit the service
        bookable_slot(
            ctx,
            &self.slot_id,
            &self.provider_id,
            Some(service.duration_minutes),
            now,
        )?;

        // 3. Claim (SlotConflict if someone else got there first)
        let token = ctx
            .slots
            .claim_in(ctx.txn, &self.slot_id, &self.order_id, now)?;

        // The provider must answer before the appointment starts
        let respond_by_deadline = (now + ctx.policy.response_window_ms).min(token.starts_at);

        // 4. Create event
        let event = super::next_event(
            &Order::new(&self.order_id),
            metadata,
            EventPayload::OrderCreated {
                client_id: metadata.actor.id.clone(),
                provider_id: self.provider_id.clone(),
                service_id: self.service_id.clone(),
                design_id: self.design_id.clone(),
                slot_id: token.slot_id,
                requested_date_time: token.starts_at,
                price,
                respond_by_deadline,
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::fixtures::*;
    use crate::slots::SlotError;
    use shared::models::{DesignUpsert, ServiceUpsert};
    use shared::order::{Actor, OrderStatus};
    use shared::schedule::SlotStatus;

    fn create_action(slot_id: &str, design_id: Option<&str>) -> CreateOrderAction {
        CreateOrderAction {
            order_id: "o-1".to_string(),
            provider_id: PROVIDER.to_string(),
            service_id: SERVICE.to_string(),
            slot_id: slot_id.to_string(),
            design_id: design_id.map(str::to_string),
        }
    }

    #[test]
    fn test_create_order_success() {
        let fx = Fixture::new();
        let slot = fx.slot(10);

        let events = fx
            .run(
                &create_action(&slot.id, Some(DESIGN)),
                "o-1",
                Actor::client(CLIENT),
                NOW,
            )
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sequence, 1);

        let order = fx.order("o-1");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.client_id, CLIENT);
        assert_eq!(order.price, Decimal::new(3500, 2));
        assert_eq!(order.requested_date_time, slot.starts_at);
        assert_eq!(
            order.respond_by_deadline,
            NOW + fx.policy.response_window_ms
        );

        let slot = fx.slots.get(&slot.id).unwrap();
        assert_eq!(slot.status, SlotStatus::Held);
        assert_eq!(slot.order_id.as_deref(), Some("o-1"));
    }

    #[test]
    fn test_create_order_slot_taken() {
        let fx = Fixture::new();
        let slot = fx.slot(10);
        fx.slots.claim(&slot.id, "other", NOW).unwrap();

        let err = fx
            .run(&create_action(&slot.id, None), "o-1", Actor::client(CLIENT), NOW)
            .unwrap_err();
        assert!(matches!(err, OrderError::Slot(SlotError::Conflict(_))));
        assert!(fx.storage.get_order("o-1").unwrap().is_none());
    }

    #[test]
    fn test_create_order_rejects_foreign_slot() {
        let fx = Fixture::new();
        let slot = fx.slot_for("p-2", 10);
        let err = fx
            .run(&create_action(&slot.id, None), "o-1", Actor::client(CLIENT), NOW)
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
        assert_eq!(fx.slots.get(&slot.id).unwrap().status, SlotStatus::Available);
    }

    #[test]
    fn test_create_order_unknown_catalog_entries() {
        let fx = Fixture::new();
        let slot = fx.slot(10);

        let mut action = create_action(&slot.id, None);
        action.service_id = "missing".into();
        assert!(matches!(
            fx.run(&action, "o-1", Actor::client(CLIENT), NOW),
            Err(OrderError::ServiceNotFound(_))
        ));

        let action = create_action(&slot.id, Some("missing"));
        assert!(matches!(
            fx.run(&action, "o-1", Actor::client(CLIENT), NOW),
            Err(OrderError::DesignNotFound(_))
        ));
        assert_eq!(fx.slots.get(&slot.id).unwrap().status, SlotStatus::Available);
    }

    #[test]
    fn test_create_order_price_overflow_is_rejected() {
        let fx = Fixture::new();
        let slot = fx.slot(10);
        fx.catalog
            .upsert_service(
                PROVIDER,
                "svc-max",
                ServiceUpsert {
                    name: "Everything".into(),
                    price: Decimal::MAX,
                    duration_minutes: 60,
                    is_active: true,
                },
            )
            .unwrap();
        fx.catalog
            .upsert_design(
                PROVIDER,
                "d-max",
                DesignUpsert {
                    name: "Gold leaf".into(),
                    price: Decimal::MAX,
                    image_url: None,
                    is_active: true,
                },
            )
            .unwrap();

        let mut action = create_action(&slot.id, Some("d-max"));
        action.service_id = "svc-max".into();
        let err = fx
            .run(&action, "o-1", Actor::client(CLIENT), NOW)
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
        assert!(fx.storage.get_order("o-1").unwrap().is_none());
        assert_eq!(fx.slots.get(&slot.id).unwrap().status, SlotStatus::Available);
    }

    #[test]
    fn test_create_order_deadline_capped_at_slot_start() {
        let fx = Fixture::new();
        let slot = fx.slot(10);
        // Two minutes before the slot, shorter than the response window
        let now = slot.starts_at - 2 * 60_000;

        fx.run(&create_action(&slot.id, None), "o-1", Actor::client(CLIENT), now)
            .unwrap();
        assert_eq!(fx.order("o-1").respond_by_deadline, slot.starts_at);
    }

    #[test]
    fn test_create_order_slot_in_past() {
        let fx = Fixture::new();
        let slot = fx.slot(10);
        let err = fx
            .run(
                &create_action(&slot.id, None),
                "o-1",
                Actor::client(CLIENT),
                slot.starts_at,
            )
            .unwrap_err();
        assert!(matches!(err, OrderError::Slot(SlotError::InPast)));
    }
}
