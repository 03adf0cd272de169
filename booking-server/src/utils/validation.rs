//! Input validation helpers
//!
//! Text length limits shared by the catalog and order handlers.

use rust_decimal::Decimal;

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: service, design
pub const MAX_NAME_LEN: usize = 200;

/// Decline reasons
pub const MAX_NOTE_LEN: usize = 500;

/// Portfolio image URLs
pub const MAX_URL_LEN: usize = 2048;

/// Opaque ids supplied in paths and bodies
pub const MAX_ID_LEN: usize = 64;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(
            AppError::validation(format!("{field} must not be empty")).with_detail("field", field)
        );
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        ))
        .with_detail("field", field));
    }
    Ok(())
}

/// Prices are non-negative
pub fn validate_price(value: Decimal, field: &str) -> Result<(), AppError> {
    if value.is_sign_negative() {
        return Err(AppError::with_message(
            shared::error::ErrorCode::ServiceInvalidPrice,
            format!("{field} must not be negative"),
        )
        .with_detail("field", field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("Manicure", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        let long = "x".repeat(MAX_NAME_LEN + 1);
        let err = validate_required_text(&long, "name", MAX_NAME_LEN).unwrap_err();
        assert_eq!(err.details.unwrap().get("field").unwrap(), "name");
    }

    #[test]
    fn test_optional_text() {
        assert!(validate_optional_text(&None, "reason", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(&Some("busy".into()), "reason", MAX_NOTE_LEN).is_ok());
        assert!(validate_optional_text(&Some("x".repeat(501)), "reason", MAX_NOTE_LEN).is_err());
    }

    #[test]
    fn test_price() {
        assert!(validate_price(Decimal::ZERO, "price").is_ok());
        assert!(validate_price(Decimal::new(-1, 2), "price").is_err());
    }
}
