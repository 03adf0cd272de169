//! 超时处理器 (Timeout Resolver)
//!
//! Guarantees progress for orders nobody acts on. Every scan reads the
//! due index and resolves each due order in its own transaction:
//!
//! | Status                 | Due when                                | Command             |
//! |------------------------|-----------------------------------------|---------------------|
//! | `pending`              | `respond_by_deadline ≤ now`             | `ExpireOrder`       |
//! | `alternative_proposed` | `respond_by_deadline ≤ now`             | `ExpireOrder`       |
//! | `confirmed`            | `confirmed_date_time + grace ≤ now`     | `AutoCompleteOrder` |
//!
//! Deadlines are data, not timers: a restarted server finds everything that
//! fell due while it was down on its first scan. Commands go through the
//! manager, so the resolver is serialized with client/provider actions and
//! an order resolved concurrently is simply skipped.

use std::sync::Arc;
use std::time::Duration;

use shared::order::{Actor, OrderCommand, OrderCommandPayload, OrderStatus};
use tokio_util::sync::CancellationToken;

use super::manager::{ManagerError, OrdersManager};
use super::traits::OrderError;

/// Outcome counters of one scan
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolveReport {
    pub timed_out: usize,
    pub auto_completed: usize,
    /// Already resolved, or index entry no longer due
    pub skipped: usize,
    /// Left in place, retried on the next scan
    pub failed: usize,
}

impl ResolveReport {
    pub fn resolved(&self) -> usize {
        self.timed_out + self.auto_completed
    }
}

/// Resolve every order that is due at `now`
///
/// One order failing never stops the scan.
pub fn resolve_due(manager: &OrdersManager, now: i64) -> ResolveReport {
    let mut report = ResolveReport::default();

    let due = match manager.storage().get_due_orders(now) {
        Ok(due) => due,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read due index");
            report.failed += 1;
            return report;
        }
    };

    for (order_id, due_at) in due {
        let order = match manager.get_order(&order_id) {
            Ok(Some(order)) => order,
            Ok(None) => {
                tracing::warn!(order_id = %order_id, "Due index points to a missing order");
                drop_stale_entry(manager, &order_id);
                report.skipped += 1;
                continue;
            }
            Err(e) => {
                tracing::error!(order_id = %order_id, error = %e, "Failed to load due order");
                report.failed += 1;
                continue;
            }
        };

        let payload = match order.status {
            OrderStatus::Pending | OrderStatus::AlternativeProposed => {
                OrderCommandPayload::ExpireOrder {
                    order_id: order_id.clone(),
                }
            }
            OrderStatus::Confirmed => OrderCommandPayload::AutoCompleteOrder {
                order_id: order_id.clone(),
            },
            _ => {
                drop_stale_entry(manager, &order_id);
                report.skipped += 1;
                continue;
            }
        };

        match manager.execute_command_at(OrderCommand::new(Actor::system(), payload), now) {
            Ok(order) if order.status == OrderStatus::Timeout => {
                tracing::info!(order_id = %order_id, due_at, "Order timed out");
                report.timed_out += 1;
            }
            Ok(_) => {
                tracing::info!(order_id = %order_id, due_at, "Order auto-completed");
                report.auto_completed += 1;
            }
            // 并发下已被处理
            Err(ManagerError::Order(
                OrderError::InvalidTransition { .. } | OrderError::PreconditionFailed { .. },
            )) => {
                tracing::debug!(order_id = %order_id, "Order no longer due, skipped");
                report.skipped += 1;
            }
            Err(e) => {
                tracing::error!(order_id = %order_id, error = %e, "Failed to resolve due order");
                report.failed += 1;
            }
        }
    }

    report
}

fn drop_stale_entry(manager: &OrdersManager, order_id: &str) {
    let result = manager.storage().begin_write().and_then(|txn| {
        manager.storage().clear_due(&txn, order_id)?;
        txn.commit()?;
        Ok(())
    });
    if let Err(e) = result {
        tracing::warn!(order_id = %order_id, error = %e, "Failed to clear stale due entry");
    }
}

/// Periodic background task around [`resolve_due`]
///
/// Registered as a periodic task in `start_background_tasks()`.
pub struct TimeoutResolver {
    manager: Arc<OrdersManager>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl TimeoutResolver {
    pub fn new(manager: Arc<OrdersManager>, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            manager,
            interval,
            shutdown,
        }
    }

    /// 主循环：启动扫描 → 周期扫描
    pub async fn run(self) {
        tracing::info!(interval_secs = self.interval.as_secs(), "Timeout resolver started");

        loop {
            self.scan().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Timeout resolver received shutdown signal");
                    break;
                }
            }
        }

        tracing::info!("Timeout resolver stopped");
    }

    async fn scan(&self) {
        let manager = self.manager.clone();
        let now = shared::util::now_millis();
        match tokio::task::spawn_blocking(move || resolve_due(&manager, now)).await {
            Ok(report) if report.resolved() > 0 || report.failed > 0 => {
                tracing::info!(
                    timed_out = report.timed_out,
                    auto_completed = report.auto_completed,
                    skipped = report.skipped,
                    failed = report.failed,
                    "Timeout resolver scan finished"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "Timeout resolver scan panicked"),
        }
    }
}
