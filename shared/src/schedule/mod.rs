//! Provider schedule types: bookable time slots

pub mod slot;

pub use slot::{ClaimToken, DaySchedule, SlotOp, SlotStatus, TimeSlot};
