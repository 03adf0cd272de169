use super::*;
use crate::orders::timeout_resolver::resolve_due;
use crate::slots::SlotError;
use rand::Rng;

// ========================================================================
// Scenario D: parallel create on one slot
// ========================================================================

#[test]
fn test_parallel_create_single_winner() {
    const CLIENTS: usize = 12;
    let env = create_test_manager();
    let s = env.slot(10);

    let results: Vec<ManagerResult<Order>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..CLIENTS)
            .map(|i| {
                let manager = env.manager.clone();
                let slot_id = s.id.clone();
                scope.spawn(move || {
                    // 随机错开启动，避免线程按创建顺序排队
                    let jitter = rand::thread_rng().gen_range(0..500);
                    std::thread::sleep(std::time::Duration::from_micros(jitter));
                    manager.execute_command_at(
                        OrderCommand::new(
                            Actor::client(format!("c-{i}")),
                            OrderCommandPayload::CreateOrder {
                                provider_id: PROVIDER.to_string(),
                                service_id: SERVICE.to_string(),
                                slot_id,
                                design_id: None,
                            },
                        ),
                        NOW,
                    )
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners: Vec<&Order> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].status, OrderStatus::Pending);

    for result in &results {
        if let Err(e) = result {
            assert!(
                matches!(e, ManagerError::Order(OrderError::Slot(SlotError::Conflict(_)))),
                "{e:?}"
            );
        }
    }
    assert_eq!(
        env.slot_state(&s.id),
        (SlotStatus::Held, Some(winners[0].id.clone()))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_create_across_slots_on_blocking_pool() {
    let env = create_test_manager();
    let slots: Vec<TimeSlot> = (8..16).map(|h| env.slot(h)).collect();

    // Two clients race for every slot
    let mut handles = Vec::new();
    for slot in &slots {
        for client in [CLIENT, OTHER_CLIENT] {
            let manager = env.manager.clone();
            let slot_id = slot.id.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                manager.execute_command_at(
                    OrderCommand::new(
                        Actor::client(client),
                        OrderCommandPayload::CreateOrder {
                            provider_id: PROVIDER.to_string(),
                            service_id: SERVICE.to_string(),
                            slot_id,
                            design_id: None,
                        },
                    ),
                    NOW,
                )
            }));
        }
    }

    let mut created = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            created += 1;
        }
    }
    assert_eq!(created, slots.len());
    for slot in &slots {
        assert_eq!(env.slot_state(&slot.id).0, SlotStatus::Held);
    }
}

// ========================================================================
// Accept racing the resolver at the proposal deadline
// ========================================================================

#[test]
fn test_accept_races_resolver() {
    for _ in 0..8 {
        let env = create_test_manager();
        let s = env.slot(10);
        let s2 = env.slot(12);
        let order = env.create(CLIENT, &s.id).unwrap();
        let order = env.propose(&order.id, &s2.id, NOW + 1_000).unwrap();
        let deadline = order.respond_by_deadline;

        std::thread::scope(|scope| {
            let manager = env.manager.clone();
            scope.spawn(move || resolve_due(&manager, deadline));
            // Deadline-bound action one tick before the deadline
            let _ = env.accept(&order.id, deadline - 1);
        });

        let order = env.manager.get_order(&order.id).unwrap().unwrap();
        match order.status {
            OrderStatus::Confirmed => {
                assert_eq!(
                    env.slot_state(&s2.id),
                    (SlotStatus::Booked, Some(order.id.clone()))
                );
            }
            OrderStatus::Timeout => {
                assert_eq!(env.slot_state(&s2.id), (SlotStatus::Available, None));
            }
            other => panic!("unexpected status {other:?}"),
        }
        assert_eq!(env.slot_state(&s.id), (SlotStatus::Available, None));
    }
}
