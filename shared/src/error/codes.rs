//! Unified error codes for the booking engine
//!
//! This module defines all error codes used across booking-server and its API clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 4xxx: Order errors
//! - 5xxx: Slot errors
//! - 6xxx: Catalog errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// Actor is not authenticated
    NotAuthenticated = 1001,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Permission ====================
    /// Actor is not the party allowed to perform this action
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Event not allowed from the order's current status
    InvalidTransition = 4002,
    /// Rating outside 1..=5
    InvalidRating = 4003,

    // ==================== 5xxx: Slot ====================
    /// Slot not found
    SlotNotFound = 5001,
    /// Slot is no longer available
    SlotConflict = 5002,
    /// Slot status does not allow the operation
    SlotInvalidTransition = 5003,
    /// Slot overlaps another slot of the same provider
    SlotOverlap = 5004,
    /// Start time is not before end time
    InvalidTimeRange = 5005,
    /// Slot belongs to another provider
    SlotProviderMismatch = 5006,
    /// Slot starts in the past
    SlotInPast = 5007,
    /// Slot is shorter than the service duration
    SlotTooShort = 5008,

    // ==================== 6xxx: Catalog ====================
    /// Service not found
    ServiceNotFound = 6001,
    /// Service has invalid price
    ServiceInvalidPrice = 6002,
    /// Design not found
    DesignNotFound = 6101,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Storage error
    StorageFailure = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",

            // Auth
            ErrorCode::NotAuthenticated => "Actor is not authenticated",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::InvalidTransition => "Transition not allowed from current order status",
            ErrorCode::InvalidRating => "Rating must be between 1 and 5",

            // Slot
            ErrorCode::SlotNotFound => "Slot not found",
            ErrorCode::SlotConflict => "Slot is no longer available",
            ErrorCode::SlotInvalidTransition => "Slot status does not allow this operation",
            ErrorCode::SlotOverlap => "Slot overlaps an existing slot",
            ErrorCode::InvalidTimeRange => "Start time must be before end time",
            ErrorCode::SlotProviderMismatch => "Slot belongs to another provider",
            ErrorCode::SlotInPast => "Slot starts in the past",
            ErrorCode::SlotTooShort => "Slot is shorter than the service duration",

            // Catalog
            ErrorCode::ServiceNotFound => "Service not found",
            ErrorCode::ServiceInvalidPrice => "Service has invalid price",
            ErrorCode::DesignNotFound => "Design not found",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::StorageFailure => "Storage temporarily unavailable, please retry",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),

            // Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::InvalidTransition),
            4003 => Ok(ErrorCode::InvalidRating),

            // Slot
            5001 => Ok(ErrorCode::SlotNotFound),
            5002 => Ok(ErrorCode::SlotConflict),
            5003 => Ok(ErrorCode::SlotInvalidTransition),
            5004 => Ok(ErrorCode::SlotOverlap),
            5005 => Ok(ErrorCode::InvalidTimeRange),
            5006 => Ok(ErrorCode::SlotProviderMismatch),
            5007 => Ok(ErrorCode::SlotInPast),
            5008 => Ok(ErrorCode::SlotTooShort),

            // Catalog
            6001 => Ok(ErrorCode::ServiceNotFound),
            6002 => Ok(ErrorCode::ServiceInvalidPrice),
            6101 => Ok(ErrorCode::DesignNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::StorageFailure),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
