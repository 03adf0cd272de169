use super::*;
use crate::orders::appliers::replay;
use crate::orders::timeout_resolver::resolve_due;
use shared::order::{CompletedBy, OrderEventType};

// ========================================================================
// Scenario A: create → confirm
// ========================================================================

#[test]
fn test_create_then_confirm() {
    let env = create_test_manager();
    let s = env.slot(10);

    let order = env.create(CLIENT, &s.id).unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.slot_id, s.id);
    assert_eq!(order.requested_date_time, s.starts_at);
    assert_eq!(
        order.respond_by_deadline,
        NOW + env.manager.policy().response_window_ms
    );
    assert_eq!(
        env.slot_state(&s.id),
        (SlotStatus::Held, Some(order.id.clone()))
    );

    let order = env.confirm(&order.id, NOW + 60_000).unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.confirmed_date_time, Some(s.starts_at));
    assert_eq!(
        env.slot_state(&s.id),
        (SlotStatus::Booked, Some(order.id.clone()))
    );
}

#[test]
fn test_price_snapshot_includes_design() {
    let env = create_test_manager();
    let s = env.slot(10);
    let order = env
        .exec(
            Actor::client(CLIENT),
            OrderCommandPayload::CreateOrder {
                provider_id: PROVIDER.to_string(),
                service_id: SERVICE.to_string(),
                slot_id: s.id.clone(),
                design_id: Some(DESIGN.to_string()),
            },
            NOW,
        )
        .unwrap();
    assert_eq!(order.price, Decimal::new(3750, 2));
    assert_eq!(order.design_id.as_deref(), Some(DESIGN));
}

// ========================================================================
// Scenario B: propose → accept
// ========================================================================

#[test]
fn test_propose_then_accept() {
    let env = create_test_manager();
    let s = env.slot(10);
    let s2 = env.slot(15);
    let order = env.create(CLIENT, &s.id).unwrap();

    let order = env.propose(&order.id, &s2.id, NOW + 1_000).unwrap();
    assert_eq!(order.status, OrderStatus::AlternativeProposed);
    assert_eq!(order.slot_id, s2.id);
    assert_eq!(order.proposed_date_time, Some(s2.starts_at));
    assert_eq!(env.slot_state(&s.id), (SlotStatus::Available, None));
    assert_eq!(
        env.slot_state(&s2.id),
        (SlotStatus::Held, Some(order.id.clone()))
    );

    let order = env.accept(&order.id, NOW + 2_000).unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.confirmed_date_time, order.proposed_date_time);
    assert_eq!(
        env.slot_state(&s2.id),
        (SlotStatus::Booked, Some(order.id.clone()))
    );
}

#[test]
fn test_propose_then_client_declines() {
    let env = create_test_manager();
    let s = env.slot(10);
    let s2 = env.slot(15);
    let order = env.create(CLIENT, &s.id).unwrap();
    env.propose(&order.id, &s2.id, NOW + 1_000).unwrap();

    let order = env
        .exec(
            Actor::client(CLIENT),
            OrderCommandPayload::DeclineProposedTime {
                order_id: order.id.clone(),
            },
            NOW + 2_000,
        )
        .unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(env.slot_state(&s.id), (SlotStatus::Available, None));
    assert_eq!(env.slot_state(&s2.id), (SlotStatus::Available, None));
}

// ========================================================================
// Scenario C: nobody answers → resolver
// ========================================================================

#[test]
fn test_resolver_times_out_pending() {
    let env = create_test_manager();
    let s = env.slot(10);
    let order = env.create(CLIENT, &s.id).unwrap();

    let report = resolve_due(&env.manager, order.respond_by_deadline + 5 * 60_000);
    assert_eq!(report.timed_out, 1);

    let order = env.manager.get_order(&order.id).unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Timeout);
    assert_eq!(env.slot_state(&s.id), (SlotStatus::Available, None));

    // Slot is bookable again
    assert!(env.create(OTHER_CLIENT, &s.id).is_ok());
}

#[test]
fn test_late_confirm_times_out_on_access() {
    let env = create_test_manager();
    let s = env.slot(10);
    let order = env.create(CLIENT, &s.id).unwrap();
    let mut rx = env.manager.subscribe();

    let err = env
        .confirm(&order.id, order.respond_by_deadline)
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::DeadlineElapsed {
            action: OrderAction::Confirm,
            ..
        }
    ));

    let stored = env.manager.get_order(&order.id).unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Timeout);
    assert_eq!(env.slot_state(&s.id), (SlotStatus::Available, None));

    let event = rx.try_recv().unwrap();
    assert_eq!(event.event_type, OrderEventType::OrderTimedOut);
    assert_eq!(event.actor_id, Actor::SYSTEM_ID);
}

#[test]
fn test_proposal_cannot_be_accepted_after_the_appointment() {
    let env = create_test_manager();
    let s = env.slot(10);
    let s2 = env.slot(11);

    // Two hours before the original slot; the proposal window is a day
    let created_at = s.starts_at - 2 * 3_600_000;
    let order = env
        .exec(
            Actor::client(CLIENT),
            OrderCommandPayload::CreateOrder {
                provider_id: PROVIDER.to_string(),
                service_id: SERVICE.to_string(),
                slot_id: s.id.clone(),
                design_id: None,
            },
            created_at,
        )
        .unwrap();
    let order = env.propose(&order.id, &s2.id, created_at + 1_000).unwrap();
    assert_eq!(order.respond_by_deadline, s2.starts_at);

    let err = env
        .accept(&order.id, s2.ends_at + 60_000)
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::DeadlineElapsed {
            action: OrderAction::AcceptProposal,
            ..
        }
    ));
    let stored = env.manager.get_order(&order.id).unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Timeout);
    assert_eq!(stored.confirmed_date_time, None);
    assert_eq!(env.slot_state(&s2.id), (SlotStatus::Available, None));
}

#[test]
fn test_resolver_expires_proposal_when_appointment_starts() {
    let env = create_test_manager();
    let s = env.slot(10);
    let s2 = env.slot(11);
    let created_at = s.starts_at - 2 * 3_600_000;
    let order = env
        .exec(
            Actor::client(CLIENT),
            OrderCommandPayload::CreateOrder {
                provider_id: PROVIDER.to_string(),
                service_id: SERVICE.to_string(),
                slot_id: s.id.clone(),
                design_id: None,
            },
            created_at,
        )
        .unwrap();
    env.propose(&order.id, &s2.id, created_at + 1_000).unwrap();

    let report = resolve_due(&env.manager, s2.starts_at);
    assert_eq!(report.timed_out, 1);
    assert_eq!(env.slot_state(&s2.id), (SlotStatus::Available, None));

    let err = env.accept(&order.id, s2.starts_at + 1).unwrap_err();
    assert!(matches!(
        err,
        ManagerError::Order(OrderError::InvalidTransition { .. })
    ));
}

// ========================================================================
// Other terminal paths
// ========================================================================

#[test]
fn test_provider_declines() {
    let env = create_test_manager();
    let s = env.slot(10);
    let order = env.create(CLIENT, &s.id).unwrap();

    let order = env
        .exec(
            Actor::provider(PROVIDER),
            OrderCommandPayload::DeclineOrder {
                order_id: order.id.clone(),
                reason: Some("Fully booked that week".to_string()),
            },
            NOW + 1_000,
        )
        .unwrap();
    assert_eq!(order.status, OrderStatus::Declined);
    assert_eq!(order.decline_reason.as_deref(), Some("Fully booked that week"));
    assert_eq!(env.slot_state(&s.id), (SlotStatus::Available, None));
}

#[test]
fn test_client_cancels_confirmed() {
    let env = create_test_manager();
    let s = env.slot(10);
    let order = env.create(CLIENT, &s.id).unwrap();
    env.confirm(&order.id, NOW + 1_000).unwrap();

    let order = env
        .exec(
            Actor::client(CLIENT),
            OrderCommandPayload::CancelOrder {
                order_id: order.id.clone(),
            },
            NOW + 2_000,
        )
        .unwrap();
    assert_eq!(order.status, OrderStatus::Cancelled);
    assert_eq!(env.slot_state(&s.id), (SlotStatus::Available, None));
}

#[test]
fn test_provider_completes_with_rating() {
    let env = create_test_manager();
    let s = env.slot(10);
    let order = env.create(CLIENT, &s.id).unwrap();
    env.confirm(&order.id, NOW + 1_000).unwrap();

    let order = env
        .exec(
            Actor::provider(PROVIDER),
            OrderCommandPayload::CompleteOrder {
                order_id: order.id.clone(),
                rating: Some(4),
            },
            s.ends_at,
        )
        .unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
    assert_eq!(order.completed_by, Some(CompletedBy::Master));
    assert_eq!(order.rating, Some(4));
    assert_eq!(env.slot_state(&s.id), (SlotStatus::Booked, None));
}

// ========================================================================
// Event stream
// ========================================================================

#[test]
fn test_event_stream_replays_to_order() {
    let env = create_test_manager();
    let s = env.slot(10);
    let s2 = env.slot(15);
    let order = env.create(CLIENT, &s.id).unwrap();
    env.propose(&order.id, &s2.id, NOW + 1_000).unwrap();
    let order = env.accept(&order.id, NOW + 2_000).unwrap();

    let events = env
        .manager
        .get_events(&Actor::client(CLIENT), &order.id)
        .unwrap();
    let types: Vec<_> = events.iter().map(|e| e.event_type).collect();
    assert_eq!(
        types,
        vec![
            OrderEventType::OrderCreated,
            OrderEventType::TimeProposed,
            OrderEventType::ProposalAccepted
        ]
    );
    let sequences: Vec<_> = events.iter().map(|e| e.sequence).collect();
    assert_eq!(sequences, vec![1, 2, 3]);
    assert_eq!(order.version, 3);

    assert_eq!(replay(&order.id, &events), order);
}

#[test]
fn test_events_are_broadcast_after_commit() {
    let env = create_test_manager();
    let mut rx = env.manager.subscribe();
    let s = env.slot(10);

    let order = env.create(CLIENT, &s.id).unwrap();
    env.confirm(&order.id, NOW + 1_000).unwrap();

    let first = rx.try_recv().unwrap();
    let second = rx.try_recv().unwrap();
    assert_eq!(first.event_type, OrderEventType::OrderCreated);
    assert_eq!(first.actor_id, CLIENT);
    assert_eq!(second.event_type, OrderEventType::OrderConfirmed);
    assert_eq!(second.actor_id, PROVIDER);
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_list_orders_by_party_and_status() {
    let env = create_test_manager();
    let a = env.create(CLIENT, &env.slot(9).id).unwrap();
    let b = env.create(CLIENT, &env.slot(11).id).unwrap();
    env.create(OTHER_CLIENT, &env.slot(13).id).unwrap();
    env.confirm(&a.id, NOW + 1_000).unwrap();

    assert_eq!(env.manager.list_orders(CLIENT, None).unwrap().len(), 2);
    assert_eq!(env.manager.list_orders(PROVIDER, None).unwrap().len(), 3);

    let pending = env
        .manager
        .list_orders(CLIENT, Some(OrderStatus::Pending))
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, b.id);
}
