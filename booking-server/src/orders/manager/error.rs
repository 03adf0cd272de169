use shared::error::{AppError, ErrorCode};
use shared::order::{OrderAction, OrderStatus};
use thiserror::Error;

use crate::db::StorageError;
use crate::orders::traits::OrderError;
use crate::slots::SlotError;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Order(#[from] OrderError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Actor is not the party the action belongs to
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Counterparty acted after `respond_by_deadline`; the order was timed out instead
    #[error("Cannot {action} order {order_id}: response deadline elapsed")]
    DeadlineElapsed {
        order_id: String,
        action: OrderAction,
    },
}

impl From<SlotError> for ManagerError {
    fn from(err: SlotError) -> Self {
        ManagerError::Order(OrderError::Slot(err))
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::OrderNotFound(id) => {
                AppError::with_message(ErrorCode::OrderNotFound, message).with_detail("order_id", id)
            }
            OrderError::InvalidTransition {
                order_id,
                status,
                action,
            } => AppError::invalid_transition(message)
                .with_detail("order_id", order_id)
                .with_detail("status", status.as_str())
                .with_detail("action", action.to_string()),
            OrderError::PreconditionFailed {
                order_id,
                action,
                reason,
            } => AppError::invalid_transition(message)
                .with_detail("order_id", order_id)
                .with_detail("action", action.to_string())
                .with_detail("reason", reason),
            OrderError::ServiceNotFound(id) => {
                AppError::with_message(ErrorCode::ServiceNotFound, message)
                    .with_detail("service_id", id)
            }
            OrderError::DesignNotFound(id) => {
                AppError::with_message(ErrorCode::DesignNotFound, message)
                    .with_detail("design_id", id)
            }
            OrderError::SlotTooShort {
                slot_id,
                required_minutes,
            } => AppError::with_message(ErrorCode::SlotTooShort, message)
                .with_detail("slot_id", slot_id)
                .with_detail("required_minutes", required_minutes),
            OrderError::InvalidRating(_) => AppError::with_message(ErrorCode::InvalidRating, message),
            OrderError::Validation(msg) => AppError::validation(msg),
            OrderError::Slot(e) => e.into(),
            OrderError::Storage(e) => AppError::storage(e.to_string()),
        }
    }
}

impl From<ManagerError> for AppError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Order(e) => e.into(),
            ManagerError::Storage(e) => AppError::storage(e.to_string()),
            ManagerError::PermissionDenied(msg) => AppError::permission_denied(msg),
            ManagerError::DeadlineElapsed { order_id, action } => AppError::invalid_transition(
                format!("Cannot {} order {}: response deadline elapsed", action, order_id),
            )
            .with_detail("order_id", order_id)
            .with_detail("status", OrderStatus::Timeout.as_str())
            .with_detail("action", action.to_string())
            .with_detail("reason", "deadline_elapsed"),
        }
    }
}
