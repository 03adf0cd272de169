use super::*;
use crate::services::CatalogService;
use crate::slots::NewSlot;
use rust_decimal::Decimal;
use shared::models::{DesignUpsert, ServiceUpsert};
use shared::schedule::{SlotStatus, TimeSlot};

/// 2027-01-15, well before every test slot
const NOW: i64 = 1_800_000_000_000;
const PROVIDER: &str = "p-1";
const OTHER_PROVIDER: &str = "p-2";
const CLIENT: &str = "c-1";
const OTHER_CLIENT: &str = "c-2";
const SERVICE: &str = "svc-1";
const DESIGN: &str = "d-1";

struct TestEnv {
    manager: Arc<OrdersManager>,
    storage: BookingStorage,
    slots: SlotRegistry,
    catalog: Arc<CatalogService>,
}

fn create_test_manager() -> TestEnv {
    let storage = BookingStorage::open_in_memory().unwrap();
    let catalog = Arc::new(CatalogService::new(storage.clone()));
    catalog
        .upsert_service(
            PROVIDER,
            SERVICE,
            ServiceUpsert {
                name: "Gel manicure".to_string(),
                price: Decimal::new(3000, 2),
                duration_minutes: 60,
                is_active: true,
            },
        )
        .unwrap();
    catalog
        .upsert_design(
            PROVIDER,
            DESIGN,
            DesignUpsert {
                name: "Ombre".to_string(),
                price: Decimal::new(750, 2),
                image_url: None,
                is_active: true,
            },
        )
        .unwrap();

    let slots = SlotRegistry::new(storage.clone(), chrono_tz::UTC);
    let manager = OrdersManager::new(
        storage.clone(),
        slots.clone(),
        catalog.clone(),
        OrderPolicy::default(),
    );
    TestEnv {
        manager: Arc::new(manager),
        storage,
        slots,
        catalog,
    }
}

// ========================================================================
// Helpers
// ========================================================================

impl TestEnv {
    /// One-hour slot of `PROVIDER` on 2030-05-06 starting at `hour`
    fn slot(&self, hour: u32) -> TimeSlot {
        self.slots
            .create_slot(
                PROVIDER,
                NewSlot {
                    date: "2030-05-06".parse().unwrap(),
                    start_time: chrono::NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
                    end_time: chrono::NaiveTime::from_hms_opt(hour + 1, 0, 0).unwrap(),
                },
                NOW,
            )
            .unwrap()
    }

    fn slot_state(&self, slot_id: &str) -> (SlotStatus, Option<String>) {
        let slot = self.slots.get(slot_id).unwrap();
        (slot.status, slot.order_id)
    }

    fn exec(&self, actor: Actor, payload: OrderCommandPayload, now: i64) -> ManagerResult<Order> {
        self.manager
            .execute_command_at(OrderCommand::new(actor, payload), now)
    }

    fn create(&self, client: &str, slot_id: &str) -> ManagerResult<Order> {
        self.exec(
            Actor::client(client),
            OrderCommandPayload::CreateOrder {
                provider_id: PROVIDER.to_string(),
                service_id: SERVICE.to_string(),
                slot_id: slot_id.to_string(),
                design_id: None,
            },
            NOW,
        )
    }

    fn confirm(&self, order_id: &str, now: i64) -> ManagerResult<Order> {
        self.exec(
            Actor::provider(PROVIDER),
            OrderCommandPayload::ConfirmOrder {
                order_id: order_id.to_string(),
            },
            now,
        )
    }

    fn propose(&self, order_id: &str, slot_id: &str, now: i64) -> ManagerResult<Order> {
        self.exec(
            Actor::provider(PROVIDER),
            OrderCommandPayload::ProposeTime {
                order_id: order_id.to_string(),
                new_slot_id: slot_id.to_string(),
            },
            now,
        )
    }

    fn accept(&self, order_id: &str, now: i64) -> ManagerResult<Order> {
        self.exec(
            Actor::client(CLIENT),
            OrderCommandPayload::AcceptProposedTime {
                order_id: order_id.to_string(),
            },
            now,
        )
    }

    fn event_count(&self, order_id: &str) -> usize {
        self.storage.get_events_for_order(order_id).unwrap().len()
    }
}

/// Payload and acting party for `action` on `order_id`
fn payload_for(action: OrderAction, order_id: &str, spare_slot: &str) -> (Actor, OrderCommandPayload) {
    let order_id = order_id.to_string();
    let payload = match action {
        OrderAction::Confirm => OrderCommandPayload::ConfirmOrder { order_id },
        OrderAction::Decline => OrderCommandPayload::DeclineOrder {
            order_id,
            reason: None,
        },
        OrderAction::ProposeTime => OrderCommandPayload::ProposeTime {
            order_id,
            new_slot_id: spare_slot.to_string(),
        },
        OrderAction::AcceptProposal => OrderCommandPayload::AcceptProposedTime { order_id },
        OrderAction::DeclineProposal => OrderCommandPayload::DeclineProposedTime { order_id },
        OrderAction::Cancel => OrderCommandPayload::CancelOrder { order_id },
        OrderAction::Complete => OrderCommandPayload::CompleteOrder {
            order_id,
            rating: None,
        },
        OrderAction::AutoComplete => OrderCommandPayload::AutoCompleteOrder { order_id },
        OrderAction::Expire => OrderCommandPayload::ExpireOrder { order_id },
    };
    let actor = match action.party() {
        Party::Client => Actor::client(CLIENT),
        Party::Provider => Actor::provider(PROVIDER),
        Party::System => Actor::system(),
    };
    (actor, payload)
}

mod test_concurrency;
mod test_flows;
