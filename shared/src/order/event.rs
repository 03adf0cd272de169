//! Order events - immutable facts recorded after command processing

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{Actor, ActorRole, CompletedBy};

/// Order event - immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderEvent {
    /// Event unique ID
    pub event_id: String,
    /// Per-order sequence, equal to the order version after this event
    pub sequence: u64,
    /// Order this event belongs to
    pub order_id: String,
    /// Engine timestamp (Unix milliseconds) - authoritative for state evolution
    pub timestamp: i64,
    /// Actor who triggered this event (`system` for resolver transitions)
    pub actor_id: String,
    pub actor_role: ActorRole,
    /// Command that triggered this event (for audit tracing)
    pub command_id: String,
    /// Event type
    pub event_type: OrderEventType,
    /// Event payload
    pub payload: EventPayload,
}

/// Event type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    OrderCreated,
    OrderConfirmed,
    OrderDeclined,
    TimeProposed,
    ProposalAccepted,
    ProposalDeclined,
    OrderCancelled,
    OrderCompleted,
    OrderTimedOut,
}

impl std::fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderEventType::OrderCreated => write!(f, "ORDER_CREATED"),
            OrderEventType::OrderConfirmed => write!(f, "ORDER_CONFIRMED"),
            OrderEventType::OrderDeclined => write!(f, "ORDER_DECLINED"),
            OrderEventType::TimeProposed => write!(f, "TIME_PROPOSED"),
            OrderEventType::ProposalAccepted => write!(f, "PROPOSAL_ACCEPTED"),
            OrderEventType::ProposalDeclined => write!(f, "PROPOSAL_DECLINED"),
            OrderEventType::OrderCancelled => write!(f, "ORDER_CANCELLED"),
            OrderEventType::OrderCompleted => write!(f, "ORDER_COMPLETED"),
            OrderEventType::OrderTimedOut => write!(f, "ORDER_TIMED_OUT"),
        }
    }
}

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    OrderCreated {
        client_id: String,
        provider_id: String,
        service_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        design_id: Option<String>,
        slot_id: String,
        requested_date_time: i64,
        price: Decimal,
        respond_by_deadline: i64,
    },

    OrderConfirmed {
        slot_id: String,
        confirmed_date_time: i64,
    },

    OrderDeclined {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Provider moved the order to another slot and waits for the client
    TimeProposed {
        previous_slot_id: String,
        slot_id: String,
        proposed_date_time: i64,
        respond_by_deadline: i64,
    },

    ProposalAccepted {
        slot_id: String,
        confirmed_date_time: i64,
    },

    ProposalDeclined {
        slot_id: String,
    },

    OrderCancelled {
        slot_id: String,
    },

    OrderCompleted {
        completed_by: CompletedBy,
        #[serde(skip_serializing_if = "Option::is_none")]
        rating: Option<u8>,
    },

    OrderTimedOut {
        slot_id: String,
        deadline: i64,
    },
}

impl EventPayload {
    pub fn event_type(&self) -> OrderEventType {
        match self {
            EventPayload::OrderCreated { .. } => OrderEventType::OrderCreated,
            EventPayload::OrderConfirmed { .. } => OrderEventType::OrderConfirmed,
            EventPayload::OrderDeclined { .. } => OrderEventType::OrderDeclined,
            EventPayload::TimeProposed { .. } => OrderEventType::TimeProposed,
            EventPayload::ProposalAccepted { .. } => OrderEventType::ProposalAccepted,
            EventPayload::ProposalDeclined { .. } => OrderEventType::ProposalDeclined,
            EventPayload::OrderCancelled { .. } => OrderEventType::OrderCancelled,
            EventPayload::OrderCompleted { .. } => OrderEventType::OrderCompleted,
            EventPayload::OrderTimedOut { .. } => OrderEventType::OrderTimedOut,
        }
    }
}

impl OrderEvent {
    /// Create a new event
    ///
    /// # Arguments
    /// * `sequence` - Per-order sequence (order version after this event)
    /// * `order_id` - Order this event belongs to
    /// * `actor` - Actor who triggered this event
    /// * `command_id` - Command that triggered this event
    /// * `timestamp` - Engine time at which the transition happened
    /// * `payload` - Event payload
    pub fn new(
        sequence: u64,
        order_id: String,
        actor: &Actor,
        command_id: String,
        timestamp: i64,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            order_id,
            timestamp,
            actor_id: actor.id.clone(),
            actor_role: actor.role,
            command_id,
            event_type: payload.event_type(),
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_follows_payload() {
        let event = OrderEvent::new(
            2,
            "o-1".into(),
            &Actor::provider("p-1"),
            "cmd-1".into(),
            1_000,
            EventPayload::OrderDeclined { reason: None },
        );
        assert_eq!(event.event_type, OrderEventType::OrderDeclined);
        assert_eq!(event.actor_role, ActorRole::Provider);
        assert_eq!(event.timestamp, 1_000);
    }

    #[test]
    fn test_payload_tagging() {
        let payload = EventPayload::OrderTimedOut {
            slot_id: "s-1".into(),
            deadline: 42,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "ORDER_TIMED_OUT");
        assert_eq!(json["slot_id"], "s-1");

        let back: EventPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_event_type_display() {
        assert_eq!(OrderEventType::TimeProposed.to_string(), "TIME_PROPOSED");
        assert_eq!(OrderEventType::OrderTimedOut.to_string(), "ORDER_TIMED_OUT");
    }
}
