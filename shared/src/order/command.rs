//! Order commands - requests from actors to change an order

use serde::{Deserialize, Serialize};

use super::lifecycle::OrderAction;
use super::types::Actor;

/// Command envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCommand {
    /// Command unique ID (for audit tracing)
    pub command_id: String,
    /// Authenticated actor issuing the command
    pub actor: Actor,
    pub payload: OrderCommandPayload,
}

impl OrderCommand {
    pub fn new(actor: Actor, payload: OrderCommandPayload) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            actor,
            payload,
        }
    }
}

/// Command payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCommandPayload {
    /// Client books `slot_id` with `provider_id`
    CreateOrder {
        provider_id: String,
        service_id: String,
        slot_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        design_id: Option<String>,
    },
    ConfirmOrder {
        order_id: String,
    },
    DeclineOrder {
        order_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    ProposeTime {
        order_id: String,
        new_slot_id: String,
    },
    AcceptProposedTime {
        order_id: String,
    },
    DeclineProposedTime {
        order_id: String,
    },
    CancelOrder {
        order_id: String,
    },
    CompleteOrder {
        order_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rating: Option<u8>,
    },
    /// Resolver: close an order whose response deadline passed
    ExpireOrder {
        order_id: String,
    },
    /// Resolver: close a confirmed order after the appointment
    AutoCompleteOrder {
        order_id: String,
    },
}

impl OrderCommandPayload {
    /// Target order, `None` for creation
    pub fn order_id(&self) -> Option<&str> {
        match self {
            OrderCommandPayload::CreateOrder { .. } => None,
            OrderCommandPayload::ConfirmOrder { order_id }
            | OrderCommandPayload::DeclineOrder { order_id, .. }
            | OrderCommandPayload::ProposeTime { order_id, .. }
            | OrderCommandPayload::AcceptProposedTime { order_id }
            | OrderCommandPayload::DeclineProposedTime { order_id }
            | OrderCommandPayload::CancelOrder { order_id }
            | OrderCommandPayload::CompleteOrder { order_id, .. }
            | OrderCommandPayload::ExpireOrder { order_id }
            | OrderCommandPayload::AutoCompleteOrder { order_id } => Some(order_id),
        }
    }

    /// Lifecycle action for commands on an existing order
    pub fn action(&self) -> Option<OrderAction> {
        match self {
            OrderCommandPayload::CreateOrder { .. } => None,
            OrderCommandPayload::ConfirmOrder { .. } => Some(OrderAction::Confirm),
            OrderCommandPayload::DeclineOrder { .. } => Some(OrderAction::Decline),
            OrderCommandPayload::ProposeTime { .. } => Some(OrderAction::ProposeTime),
            OrderCommandPayload::AcceptProposedTime { .. } => Some(OrderAction::AcceptProposal),
            OrderCommandPayload::DeclineProposedTime { .. } => Some(OrderAction::DeclineProposal),
            OrderCommandPayload::CancelOrder { .. } => Some(OrderAction::Cancel),
            OrderCommandPayload::CompleteOrder { .. } => Some(OrderAction::Complete),
            OrderCommandPayload::ExpireOrder { .. } => Some(OrderAction::Expire),
            OrderCommandPayload::AutoCompleteOrder { .. } => Some(OrderAction::AutoComplete),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_order_id_and_action() {
        let create = OrderCommandPayload::CreateOrder {
            provider_id: "p".into(),
            service_id: "s".into(),
            slot_id: "slot".into(),
            design_id: None,
        };
        assert_eq!(create.order_id(), None);
        assert_eq!(create.action(), None);

        let propose = OrderCommandPayload::ProposeTime {
            order_id: "o-1".into(),
            new_slot_id: "slot-2".into(),
        };
        assert_eq!(propose.order_id(), Some("o-1"));
        assert_eq!(propose.action(), Some(OrderAction::ProposeTime));
    }

    #[test]
    fn test_payload_deserialize_with_defaults() {
        let json = r#"{"type":"DECLINE_ORDER","order_id":"o-9"}"#;
        let payload: OrderCommandPayload = serde_json::from_str(json).unwrap();
        assert!(matches!(
            payload,
            OrderCommandPayload::DeclineOrder { ref order_id, reason: None } if order_id == "o-9"
        ));
    }
}
