//! 订单事件通知 - 审计监听器
//!
//! 订阅 [`OrdersManager`](crate::orders::OrdersManager) 的事件广播，把每个
//! 已提交的状态转换写入 `audit` 日志 target。广播是 fire-and-forget：
//! 监听器落后时跳过的事件仍然保存在 redb 事件表中，可以通过
//! `GET /api/orders/{id}/events` 查回。

use shared::order::{EventPayload, OrderEvent};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::audit_log;

/// 审计监听器
pub struct AuditListener {
    source: broadcast::Receiver<OrderEvent>,
    shutdown: CancellationToken,
}

impl AuditListener {
    pub fn new(source: broadcast::Receiver<OrderEvent>, shutdown: CancellationToken) -> Self {
        Self { source, shutdown }
    }

    /// 运行监听 (直到关闭信号或源通道关闭)，返回已记录的事件数
    pub async fn run(mut self) -> u64 {
        tracing::info!("Audit listener started");
        let mut recorded = 0u64;

        loop {
            tokio::select! {
                received = self.source.recv() => match received {
                    Ok(event) => {
                        record(&event);
                        recorded += 1;
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(
                            skipped = n,
                            "Audit listener lagged, events skipped (still stored in event log)"
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event channel closed, audit listener stopping");
                        break;
                    }
                },
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Audit listener received shutdown signal");
                    break;
                }
            }
        }

        recorded
    }
}

/// 单个事件写入审计日志
fn record(event: &OrderEvent) {
    let detail = summarize(&event.payload);
    audit_log!(
        event.actor_id,
        event.event_type,
        event.order_id,
        role = %event.actor_role,
        sequence = event.sequence,
        detail = %detail,
        "AUDIT"
    );
}

/// 事件的一行摘要
fn summarize(payload: &EventPayload) -> String {
    match payload {
        EventPayload::OrderCreated {
            client_id,
            provider_id,
            slot_id,
            price,
            ..
        } => format!("client={client_id} provider={provider_id} slot={slot_id} price={price}"),
        EventPayload::OrderConfirmed { slot_id, .. }
        | EventPayload::ProposalAccepted { slot_id, .. } => format!("slot={slot_id}"),
        EventPayload::OrderDeclined { reason } => {
            format!("reason={}", reason.as_deref().unwrap_or("-"))
        }
        EventPayload::TimeProposed {
            previous_slot_id,
            slot_id,
            ..
        } => format!("slot={previous_slot_id}->{slot_id}"),
        EventPayload::ProposalDeclined { slot_id } | EventPayload::OrderCancelled { slot_id } => {
            format!("released={slot_id}")
        }
        EventPayload::OrderCompleted {
            completed_by,
            rating,
        } => match rating {
            Some(r) => format!("by={completed_by:?} rating={r}"),
            None => format!("by={completed_by:?}"),
        },
        EventPayload::OrderTimedOut { slot_id, deadline } => {
            format!("released={slot_id} deadline={deadline}")
        }
    }
}
