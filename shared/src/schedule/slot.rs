//! Time slot - a single bookable window published by a provider
//!
//! | From        | Op            | To          |
//! |-------------|---------------|-------------|
//! | `available` | Claim         | `held`      |
//! | `held`      | Commit        | `booked`    |
//! | `held`      | Release       | `available` |
//! | `booked`    | CancelBooking | `available` |
//! | `booked`    | Finish        | `booked`    |
//! | `available` | Block         | `blocked`   |
//! | `blocked`   | Unblock       | `available` |

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Slot status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    #[default]
    Available,
    /// Claimed by a pending or proposed order
    Held,
    /// Reserved by a confirmed order (or consumed by a completed one)
    Booked,
    /// Closed by the provider
    Blocked,
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotStatus::Available => write!(f, "available"),
            SlotStatus::Held => write!(f, "held"),
            SlotStatus::Booked => write!(f, "booked"),
            SlotStatus::Blocked => write!(f, "blocked"),
        }
    }
}

/// Operations the slot registry applies to a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotOp {
    Claim,
    Commit,
    Release,
    CancelBooking,
    Finish,
    Block,
    Unblock,
}

impl SlotStatus {
    pub fn next(self, op: SlotOp) -> Option<SlotStatus> {
        use SlotOp as O;
        use SlotStatus as S;

        match (self, op) {
            (S::Available, O::Claim) => Some(S::Held),
            (S::Held, O::Commit) => Some(S::Booked),
            (S::Held, O::Release) => Some(S::Available),
            (S::Booked, O::CancelBooking) => Some(S::Available),
            (S::Booked, O::Finish) => Some(S::Booked),
            (S::Available, O::Block) => Some(S::Blocked),
            (S::Blocked, O::Unblock) => Some(S::Available),
            _ => None,
        }
    }

    /// Provider may delete the slot
    pub fn is_removable(&self) -> bool {
        matches!(self, SlotStatus::Available | SlotStatus::Blocked)
    }
}

/// A bookable window
///
/// `date`/`start_time`/`end_time` are the provider's wall clock;
/// `starts_at`/`ends_at` are the same instants in Unix milliseconds,
/// resolved once in the business time zone when the slot is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlot {
    pub id: String,
    pub provider_id: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub starts_at: i64,
    pub ends_at: i64,
    pub status: SlotStatus,
    /// Order currently holding or booking this slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub version: u64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TimeSlot {
    pub fn duration_minutes(&self) -> i64 {
        (self.ends_at - self.starts_at) / 60_000
    }

    /// Half-open interval overlap on the same provider and day
    pub fn overlaps(&self, start: NaiveTime, end: NaiveTime) -> bool {
        self.start_time < end && start < self.end_time
    }

    pub fn is_held_by(&self, order_id: &str) -> bool {
        self.status == SlotStatus::Held && self.order_id.as_deref() == Some(order_id)
    }

    pub fn is_booked_by(&self, order_id: &str) -> bool {
        self.status == SlotStatus::Booked && self.order_id.as_deref() == Some(order_id)
    }
}

/// Proof of a successful claim
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimToken {
    pub slot_id: String,
    pub order_id: String,
    /// Slot version after the claim
    pub version: u64,
    pub starts_at: i64,
    pub ends_at: i64,
}

/// Slots of one provider on one calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaySchedule {
    pub date: NaiveDate,
    pub slots: Vec<TimeSlot>,
}

impl DaySchedule {
    /// Group slots (already sorted by start) into consecutive days
    pub fn group(slots: Vec<TimeSlot>) -> Vec<DaySchedule> {
        let mut days: Vec<DaySchedule> = Vec::new();
        for slot in slots {
            match days.last_mut() {
                Some(day) if day.date == slot.date => day.slots.push(slot),
                _ => days.push(DaySchedule {
                    date: slot.date,
                    slots: vec![slot],
                }),
            }
        }
        days
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(id: &str, date: &str, start: &str, end: &str) -> TimeSlot {
        TimeSlot {
            id: id.into(),
            provider_id: "p-1".into(),
            date: date.parse().unwrap(),
            start_time: start.parse().unwrap(),
            end_time: end.parse().unwrap(),
            starts_at: 0,
            ends_at: 3_600_000,
            status: SlotStatus::Available,
            order_id: None,
            version: 0,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_slot_transitions() {
        assert_eq!(SlotStatus::Available.next(SlotOp::Claim), Some(SlotStatus::Held));
        assert_eq!(SlotStatus::Held.next(SlotOp::Claim), None);
        assert_eq!(SlotStatus::Booked.next(SlotOp::Claim), None);
        assert_eq!(SlotStatus::Blocked.next(SlotOp::Claim), None);
        assert_eq!(SlotStatus::Held.next(SlotOp::Commit), Some(SlotStatus::Booked));
        assert_eq!(SlotStatus::Available.next(SlotOp::Commit), None);
        assert_eq!(SlotStatus::Held.next(SlotOp::Block), None);
        assert_eq!(SlotStatus::Booked.next(SlotOp::Block), None);
        assert_eq!(
            SlotStatus::Booked.next(SlotOp::CancelBooking),
            Some(SlotStatus::Available)
        );
    }

    #[test]
    fn test_overlap_is_half_open() {
        let s = slot("a", "2026-03-02", "10:00:00", "11:00:00");
        let t = |v: &str| v.parse::<NaiveTime>().unwrap();
        assert!(s.overlaps(t("10:30:00"), t("11:30:00")));
        assert!(s.overlaps(t("09:00:00"), t("12:00:00")));
        assert!(!s.overlaps(t("11:00:00"), t("12:00:00")));
        assert!(!s.overlaps(t("09:00:00"), t("10:00:00")));
    }

    #[test]
    fn test_group_by_day() {
        let days = DaySchedule::group(vec![
            slot("a", "2026-03-02", "10:00:00", "11:00:00"),
            slot("b", "2026-03-02", "12:00:00", "13:00:00"),
            slot("c", "2026-03-04", "09:00:00", "10:00:00"),
        ]);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].slots.len(), 2);
        assert_eq!(days[1].date, "2026-03-04".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn test_duration_minutes() {
        assert_eq!(slot("a", "2026-03-02", "10:00:00", "11:00:00").duration_minutes(), 60);
    }
}
