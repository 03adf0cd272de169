//! Order record - current state folded from the event stream
//!
//! All instants are Unix milliseconds. The record is only ever mutated by
//! applying an [`OrderEvent`](super::OrderEvent); `version` equals the
//! sequence of the last applied event.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::CompletedBy;

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Waiting for the provider
    #[default]
    Pending,
    /// Provider offered another slot, waiting for the client
    AlternativeProposed,
    Confirmed,
    Completed,
    Cancelled,
    Declined,
    /// Nobody answered before `respond_by_deadline`
    Timeout,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::AlternativeProposed,
        OrderStatus::Confirmed,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
        OrderStatus::Declined,
        OrderStatus::Timeout,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Completed
                | OrderStatus::Cancelled
                | OrderStatus::Declined
                | OrderStatus::Timeout
        )
    }

    /// Statuses that carry a live response deadline
    pub fn awaits_response(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::AlternativeProposed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::AlternativeProposed => "alternative_proposed",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Declined => "declined",
            OrderStatus::Timeout => "timeout",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status: {s}"))
    }
}

/// A booking between one client and one provider for one slot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Order {
    pub id: String,
    pub client_id: String,
    pub provider_id: String,
    pub service_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub design_id: Option<String>,
    pub status: OrderStatus,
    /// Slot currently claimed; after termination, the last slot held
    pub slot_id: String,
    pub requested_date_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_date_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_date_time: Option<i64>,
    /// Price snapshot fixed at creation
    pub price: Decimal,
    pub created_at: i64,
    pub updated_at: i64,
    /// Provider deadline while pending, client deadline while a proposal is open
    pub respond_by_deadline: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<CompletedBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decline_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    pub version: u64,
}

impl Order {
    /// Empty record for `id`; populated by folding its `OrderCreated` event
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// True when the order still waits for an answer and the deadline has passed
    pub fn is_overdue(&self, now: i64) -> bool {
        self.status.awaits_response() && self.respond_by_deadline <= now
    }

    /// Instant at which the resolver has to look at this order again
    ///
    /// Pending and proposed orders are due at their response deadline,
    /// confirmed orders once the appointment time plus `auto_complete_grace_ms`
    /// has passed. Terminal orders are never due.
    pub fn due_at(&self, auto_complete_grace_ms: i64) -> Option<i64> {
        match self.status {
            OrderStatus::Pending | OrderStatus::AlternativeProposed => {
                Some(self.respond_by_deadline)
            }
            OrderStatus::Confirmed => self
                .confirmed_date_time
                .map(|t| t.saturating_add(auto_complete_grace_ms)),
            _ => None,
        }
    }

    /// Does `actor_id` take part in this order
    pub fn involves(&self, actor_id: &str) -> bool {
        self.client_id == actor_id || self.provider_id == actor_id
    }
}
