//! Slot registry
//!
//! 每个状态变更都是单个 redb 写事务内的 read-check-write，
//! redb 同一时刻只允许一个写事务，所以对同一时段的并发 claim
//! 恰好只有一个成功。
//!
//! `*_in` 变体接收调用方已打开的事务，订单状态机用它们把时段变更
//! 和订单转换放进同一次提交。

use chrono::{NaiveDate, NaiveTime};
use chrono_tz::Tz;
use redb::WriteTransaction;
use serde::Deserialize;
use shared::schedule::{ClaimToken, DaySchedule, SlotOp, SlotStatus, TimeSlot};
use shared::util::new_id;

use super::error::{SlotError, SlotResult};
use crate::db::BookingStorage;
use crate::utils::time::local_to_millis;

/// Provider input for a new slot
#[derive(Debug, Clone, Deserialize)]
pub struct NewSlot {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Clone)]
pub struct SlotRegistry {
    storage: BookingStorage,
    tz: Tz,
}

impl SlotRegistry {
    pub fn new(storage: BookingStorage, tz: Tz) -> Self {
        Self { storage, tz }
    }

    // ========== Queries ==========

    pub fn get(&self, slot_id: &str) -> SlotResult<TimeSlot> {
        self.storage
            .get_slot(slot_id)?
            .ok_or_else(|| SlotError::NotFound(slot_id.to_string()))
    }

    /// Available slots of a provider between two dates (inclusive), sorted by start
    pub fn list_available(
        &self,
        provider_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> SlotResult<Vec<TimeSlot>> {
        let mut slots = self.list_slots(provider_id, from, to)?;
        slots.retain(|s| s.status == SlotStatus::Available);
        Ok(slots)
    }

    /// All slots of a provider between two dates, any status (owner view)
    pub fn list_slots(
        &self,
        provider_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> SlotResult<Vec<TimeSlot>> {
        Ok(self
            .storage
            .list_provider_slots(provider_id, &from.to_string(), &to.to_string())?)
    }

    /// Schedule grouped per day
    pub fn schedule(
        &self,
        provider_id: &str,
        from: NaiveDate,
        to: NaiveDate,
        include_all: bool,
    ) -> SlotResult<Vec<DaySchedule>> {
        let slots = if include_all {
            self.list_slots(provider_id, from, to)?
        } else {
            self.list_available(provider_id, from, to)?
        };
        Ok(DaySchedule::group(slots))
    }

    // ========== Order-driven operations (within transaction) ==========

    /// `available → held`
    pub fn claim_in(
        &self,
        txn: &WriteTransaction,
        slot_id: &str,
        order_id: &str,
        now: i64,
    ) -> SlotResult<ClaimToken> {
        let mut slot = self.load(txn, slot_id)?;
        let Some(next) = slot.status.next(SlotOp::Claim) else {
            return Err(SlotError::Conflict(slot_id.to_string()));
        };

        slot.order_id = Some(order_id.to_string());
        self.store(txn, &mut slot, next, now)?;

        Ok(ClaimToken {
            slot_id: slot.id,
            order_id: order_id.to_string(),
            version: slot.version,
            starts_at: slot.starts_at,
            ends_at: slot.ends_at,
        })
    }

    /// `held → available`; no-op if the slot is already available
    pub fn release_in(
        &self,
        txn: &WriteTransaction,
        slot_id: &str,
        order_id: &str,
        now: i64,
    ) -> SlotResult<()> {
        let mut slot = self.load(txn, slot_id)?;
        if slot.status == SlotStatus::Available {
            return Ok(());
        }
        if !slot.is_held_by(order_id) {
            return Err(invalid(&slot, SlotOp::Release));
        }

        slot.order_id = None;
        self.store(txn, &mut slot, SlotStatus::Available, now)
    }

    /// `held → booked`; the slot must be held by `order_id`
    pub fn commit_in(
        &self,
        txn: &WriteTransaction,
        slot_id: &str,
        order_id: &str,
        now: i64,
    ) -> SlotResult<()> {
        let mut slot = self.load(txn, slot_id)?;
        if !slot.is_held_by(order_id) {
            return Err(invalid(&slot, SlotOp::Commit));
        }
        self.store(txn, &mut slot, SlotStatus::Booked, now)
    }

    /// `booked → available` when a confirmed order is cancelled
    pub fn cancel_booking_in(
        &self,
        txn: &WriteTransaction,
        slot_id: &str,
        order_id: &str,
        now: i64,
    ) -> SlotResult<()> {
        let mut slot = self.load(txn, slot_id)?;
        if !slot.is_booked_by(order_id) {
            return Err(invalid(&slot, SlotOp::CancelBooking));
        }
        slot.order_id = None;
        self.store(txn, &mut slot, SlotStatus::Available, now)
    }

    /// Completed order: slot stays `booked`, order reference is dropped
    pub fn finish_booking_in(
        &self,
        txn: &WriteTransaction,
        slot_id: &str,
        order_id: &str,
        now: i64,
    ) -> SlotResult<()> {
        let mut slot = self.load(txn, slot_id)?;
        if !slot.is_booked_by(order_id) {
            return Err(invalid(&slot, SlotOp::Finish));
        }
        slot.order_id = None;
        self.store(txn, &mut slot, SlotStatus::Booked, now)
    }

    // ========== Standalone operations ==========

    pub fn claim(&self, slot_id: &str, order_id: &str, now: i64) -> SlotResult<ClaimToken> {
        let txn = self.storage.begin_write()?;
        let token = self.claim_in(&txn, slot_id, order_id, now)?;
        txn.commit().map_err(crate::db::StorageError::from)?;
        Ok(token)
    }

    pub fn release(&self, slot_id: &str, order_id: &str, now: i64) -> SlotResult<()> {
        let txn = self.storage.begin_write()?;
        self.release_in(&txn, slot_id, order_id, now)?;
        txn.commit().map_err(crate::db::StorageError::from)?;
        Ok(())
    }

    pub fn commit(&self, slot_id: &str, order_id: &str, now: i64) -> SlotResult<()> {
        let txn = self.storage.begin_write()?;
        self.commit_in(&txn, slot_id, order_id, now)?;
        txn.commit().map_err(crate::db::StorageError::from)?;
        Ok(())
    }

    // ========== Provider operations ==========

    /// `available → blocked`
    pub fn block(&self, provider_id: &str, slot_id: &str, now: i64) -> SlotResult<TimeSlot> {
        self.provider_op(provider_id, slot_id, SlotOp::Block, now)
    }

    /// `blocked → available`
    pub fn unblock(&self, provider_id: &str, slot_id: &str, now: i64) -> SlotResult<TimeSlot> {
        self.provider_op(provider_id, slot_id, SlotOp::Unblock, now)
    }

    /// Publish a new available slot
    ///
    /// Rejects empty/inverted ranges, slots starting at or before `now`
    /// and any overlap with the provider's other slots on that day.
    pub fn create_slot(
        &self,
        provider_id: &str,
        input: NewSlot,
        now: i64,
    ) -> SlotResult<TimeSlot> {
        if input.start_time >= input.end_time {
            return Err(SlotError::InvalidTimeRange);
        }
        let to_instant = |time: NaiveTime| {
            local_to_millis(input.date, time, self.tz)
                .ok_or_else(|| SlotError::NonexistentLocalTime(input.date.and_time(time).to_string()))
        };
        let starts_at = to_instant(input.start_time)?;
        let ends_at = to_instant(input.end_time)?;
        if ends_at <= starts_at {
            return Err(SlotError::InvalidTimeRange);
        }
        if starts_at <= now {
            return Err(SlotError::InPast);
        }

        let txn = self.storage.begin_write()?;
        let date = input.date.to_string();
        let day = self.storage.get_day_slots_txn(&txn, provider_id, &date)?;
        if let Some(existing) = day
            .iter()
            .find(|s| s.overlaps(input.start_time, input.end_time))
        {
            return Err(SlotError::Overlap(existing.id.clone()));
        }

        let slot = TimeSlot {
            id: new_id(),
            provider_id: provider_id.to_string(),
            date: input.date,
            start_time: input.start_time,
            end_time: input.end_time,
            starts_at,
            ends_at,
            status: SlotStatus::Available,
            order_id: None,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        self.storage.put_slot(&txn, &slot)?;
        txn.commit().map_err(crate::db::StorageError::from)?;

        tracing::debug!(slot_id = %slot.id, provider_id, "Slot created");
        Ok(slot)
    }

    /// Delete an `available` or `blocked` slot
    pub fn remove_slot(&self, provider_id: &str, slot_id: &str) -> SlotResult<()> {
        let txn = self.storage.begin_write()?;
        let slot = self.load(&txn, slot_id)?;
        if slot.provider_id != provider_id {
            return Err(SlotError::NotOwner(slot_id.to_string()));
        }
        if !slot.status.is_removable() {
            return Err(SlotError::InvalidTransition {
                slot_id: slot.id,
                status: slot.status,
                op: SlotOp::Release,
            });
        }
        self.storage.delete_slot(&txn, &slot)?;
        txn.commit().map_err(crate::db::StorageError::from)?;
        Ok(())
    }

    // ========== Internals ==========

    fn provider_op(
        &self,
        provider_id: &str,
        slot_id: &str,
        op: SlotOp,
        now: i64,
    ) -> SlotResult<TimeSlot> {
        let txn = self.storage.begin_write()?;
        let mut slot = self.load(&txn, slot_id)?;
        if slot.provider_id != provider_id {
            return Err(SlotError::NotOwner(slot_id.to_string()));
        }
        let next = slot.status.next(op).ok_or_else(|| invalid(&slot, op))?;
        self.store(&txn, &mut slot, next, now)?;
        txn.commit().map_err(crate::db::StorageError::from)?;
        Ok(slot)
    }

    fn load(&self, txn: &WriteTransaction, slot_id: &str) -> SlotResult<TimeSlot> {
        self.storage
            .get_slot_txn(txn, slot_id)?
            .ok_or_else(|| SlotError::NotFound(slot_id.to_string()))
    }

    fn store(
        &self,
        txn: &WriteTransaction,
        slot: &mut TimeSlot,
        status: SlotStatus,
        now: i64,
    ) -> SlotResult<()> {
        slot.status = status;
        slot.version += 1;
        slot.updated_at = now;
        self.storage.put_slot(txn, slot)?;
        Ok(())
    }
}

fn invalid(slot: &TimeSlot, op: SlotOp) -> SlotError {
    SlotError::InvalidTransition {
        slot_id: slot.id.clone(),
        status: slot.status,
        op,
    }
}
