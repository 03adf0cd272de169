//! Slot registry errors

use shared::error::{AppError, ErrorCode};
use shared::schedule::{SlotOp, SlotStatus};
use thiserror::Error;

use crate::db::StorageError;

#[derive(Debug, Error)]
pub enum SlotError {
    #[error("Slot not found: {0}")]
    NotFound(String),

    /// Claim lost: the slot is not `available` any more
    #[error("Slot {0} is no longer available")]
    Conflict(String),

    #[error("Slot {slot_id} is {status}, cannot {op:?}")]
    InvalidTransition {
        slot_id: String,
        status: SlotStatus,
        op: SlotOp,
    },

    #[error("Slot overlaps existing slot {0}")]
    Overlap(String),

    #[error("Start time must be before end time")]
    InvalidTimeRange,

    /// Local time skipped by a daylight-saving jump
    #[error("Local time {0} does not exist in the business timezone")]
    NonexistentLocalTime(String),

    #[error("Slot {0} belongs to another provider")]
    NotOwner(String),

    #[error("Slot starts in the past")]
    InPast,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type SlotResult<T> = Result<T, SlotError>;

impl From<SlotError> for AppError {
    fn from(err: SlotError) -> Self {
        match err {
            SlotError::NotFound(id) => {
                AppError::new(ErrorCode::SlotNotFound).with_detail("slot_id", id)
            }
            SlotError::Conflict(id) => AppError::slot_conflict(id),
            SlotError::InvalidTransition { ref slot_id, .. } => {
                let slot_id = slot_id.clone();
                AppError::with_message(ErrorCode::SlotInvalidTransition, err.to_string())
                    .with_detail("slot_id", slot_id)
            }
            SlotError::Overlap(id) => AppError::new(ErrorCode::SlotOverlap)
                .with_detail("overlapping_slot_id", id),
            SlotError::InvalidTimeRange => AppError::new(ErrorCode::InvalidTimeRange),
            SlotError::NonexistentLocalTime(ref local) => {
                let local = local.clone();
                AppError::with_message(ErrorCode::InvalidTimeRange, err.to_string())
                    .with_detail("local_time", local)
            }
            SlotError::NotOwner(id) => {
                AppError::new(ErrorCode::SlotProviderMismatch).with_detail("slot_id", id)
            }
            SlotError::InPast => AppError::new(ErrorCode::SlotInPast),
            SlotError::Storage(e) => AppError::storage(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_slot_error_status_codes() {
        let conflict: AppError = SlotError::Conflict("s-1".into()).into();
        assert_eq!(conflict.http_status(), StatusCode::CONFLICT);

        let missing: AppError = SlotError::NotFound("s-1".into()).into();
        assert_eq!(missing.http_status(), StatusCode::NOT_FOUND);

        let busy: AppError = SlotError::InvalidTransition {
            slot_id: "s-1".into(),
            status: SlotStatus::Held,
            op: SlotOp::Block,
        }
        .into();
        assert_eq!(busy.code, ErrorCode::SlotInvalidTransition);
        assert_eq!(busy.http_status(), StatusCode::CONFLICT);

        let foreign: AppError = SlotError::NotOwner("s-1".into()).into();
        assert_eq!(foreign.http_status(), StatusCode::FORBIDDEN);

        let range: AppError = SlotError::InvalidTimeRange.into();
        assert_eq!(range.http_status(), StatusCode::BAD_REQUEST);

        let gap: AppError = SlotError::NonexistentLocalTime("2030-03-31 02:30:00".into()).into();
        assert_eq!(gap.code, ErrorCode::InvalidTimeRange);
        assert_eq!(gap.http_status(), StatusCode::BAD_REQUEST);
    }
}
