//! Order lifecycle - the single transition table
//!
//! | From                   | Action          | To                     | Party    |
//! |------------------------|-----------------|------------------------|----------|
//! | `pending`              | Confirm         | `confirmed`            | provider |
//! | `pending`              | Decline         | `declined`             | provider |
//! | `pending`              | ProposeTime     | `alternative_proposed` | provider |
//! | `pending`              | Expire          | `timeout`              | system   |
//! | `alternative_proposed` | AcceptProposal  | `confirmed`            | client   |
//! | `alternative_proposed` | DeclineProposal | `cancelled`            | client   |
//! | `alternative_proposed` | Expire          | `timeout`              | system   |
//! | `confirmed`            | Complete        | `completed`            | provider |
//! | `confirmed`            | AutoComplete    | `completed`            | system   |
//! | `confirmed`            | Cancel          | `cancelled`            | client   |
//!
//! Any pair not listed is rejected. Terminal statuses have no outgoing rows.

use serde::{Deserialize, Serialize};

use super::snapshot::OrderStatus;

/// An event a party can apply to an existing order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    Confirm,
    Decline,
    ProposeTime,
    AcceptProposal,
    DeclineProposal,
    Cancel,
    Complete,
    AutoComplete,
    Expire,
}

/// Which side of the order may trigger an action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Client,
    Provider,
    System,
}

impl OrderAction {
    pub const ALL: [OrderAction; 9] = [
        OrderAction::Confirm,
        OrderAction::Decline,
        OrderAction::ProposeTime,
        OrderAction::AcceptProposal,
        OrderAction::DeclineProposal,
        OrderAction::Cancel,
        OrderAction::Complete,
        OrderAction::AutoComplete,
        OrderAction::Expire,
    ];

    pub fn party(&self) -> Party {
        match self {
            OrderAction::Confirm
            | OrderAction::Decline
            | OrderAction::ProposeTime
            | OrderAction::Complete => Party::Provider,
            OrderAction::AcceptProposal | OrderAction::DeclineProposal | OrderAction::Cancel => {
                Party::Client
            }
            OrderAction::AutoComplete | OrderAction::Expire => Party::System,
        }
    }

    /// Counterparty actions that must land before `respond_by_deadline`
    pub fn is_deadline_bound(&self) -> bool {
        matches!(
            self,
            OrderAction::Confirm
                | OrderAction::Decline
                | OrderAction::ProposeTime
                | OrderAction::AcceptProposal
                | OrderAction::DeclineProposal
        )
    }
}

impl std::fmt::Display for OrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderAction::Confirm => "confirm",
            OrderAction::Decline => "decline",
            OrderAction::ProposeTime => "propose_time",
            OrderAction::AcceptProposal => "accept_proposed_time",
            OrderAction::DeclineProposal => "decline_proposed_time",
            OrderAction::Cancel => "cancel",
            OrderAction::Complete => "complete",
            OrderAction::AutoComplete => "auto_complete",
            OrderAction::Expire => "expire",
        };
        f.write_str(name)
    }
}

impl OrderStatus {
    /// Target status for `action`, or `None` when the pair is not in the table
    pub fn next(self, action: OrderAction) -> Option<OrderStatus> {
        use OrderAction as A;
        use OrderStatus as S;

        match (self, action) {
            (S::Pending, A::Confirm) => Some(S::Confirmed),
            (S::Pending, A::Decline) => Some(S::Declined),
            (S::Pending, A::ProposeTime) => Some(S::AlternativeProposed),
            (S::Pending, A::Expire) => Some(S::Timeout),
            (S::AlternativeProposed, A::AcceptProposal) => Some(S::Confirmed),
            (S::AlternativeProposed, A::DeclineProposal) => Some(S::Cancelled),
            (S::AlternativeProposed, A::Expire) => Some(S::Timeout),
            (S::Confirmed, A::Complete) => Some(S::Completed),
            (S::Confirmed, A::AutoComplete) => Some(S::Completed),
            (S::Confirmed, A::Cancel) => Some(S::Cancelled),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_have_no_transitions() {
        for status in OrderStatus::ALL.iter().filter(|s| s.is_terminal()) {
            for action in OrderAction::ALL {
                assert_eq!(status.next(action), None, "{status:?} + {action:?}");
            }
        }
    }

    #[test]
    fn test_table_row_count() {
        let rows = OrderStatus::ALL
            .iter()
            .flat_map(|s| OrderAction::ALL.iter().map(move |a| s.next(*a)))
            .filter(Option::is_some)
            .count();
        assert_eq!(rows, 10);
    }

    #[test]
    fn test_pending_transitions() {
        let s = OrderStatus::Pending;
        assert_eq!(s.next(OrderAction::Confirm), Some(OrderStatus::Confirmed));
        assert_eq!(s.next(OrderAction::Decline), Some(OrderStatus::Declined));
        assert_eq!(
            s.next(OrderAction::ProposeTime),
            Some(OrderStatus::AlternativeProposed)
        );
        assert_eq!(s.next(OrderAction::Expire), Some(OrderStatus::Timeout));
        assert_eq!(s.next(OrderAction::Cancel), None);
        assert_eq!(s.next(OrderAction::AcceptProposal), None);
        assert_eq!(s.next(OrderAction::Complete), None);
    }

    #[test]
    fn test_confirmed_cannot_expire() {
        assert_eq!(OrderStatus::Confirmed.next(OrderAction::Expire), None);
        assert_eq!(OrderStatus::Confirmed.next(OrderAction::Confirm), None);
    }

    #[test]
    fn test_parties() {
        assert_eq!(OrderAction::Confirm.party(), Party::Provider);
        assert_eq!(OrderAction::ProposeTime.party(), Party::Provider);
        assert_eq!(OrderAction::AcceptProposal.party(), Party::Client);
        assert_eq!(OrderAction::Cancel.party(), Party::Client);
        assert_eq!(OrderAction::Expire.party(), Party::System);
        assert_eq!(OrderAction::AutoComplete.party(), Party::System);
    }

    #[test]
    fn test_deadline_bound_actions() {
        assert!(OrderAction::Confirm.is_deadline_bound());
        assert!(OrderAction::AcceptProposal.is_deadline_bound());
        assert!(!OrderAction::Cancel.is_deadline_bound());
        assert!(!OrderAction::Complete.is_deadline_bound());
        assert!(!OrderAction::Expire.is_deadline_bound());
    }
}
