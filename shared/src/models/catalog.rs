//! Catalog models - what a provider sells
//!
//! The booking engine reads these once per order to snapshot the price.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A bookable service (haircut, manicure, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceInfo {
    pub id: String,
    pub provider_id: String,
    pub name: String,
    pub price: Decimal,
    /// Minimum slot length this service needs
    pub duration_minutes: u32,
    pub is_active: bool,
}

/// Upsert service payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceUpsert {
    pub name: String,
    pub price: Decimal,
    pub duration_minutes: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Optional add-on (nail design, colouring, ...) priced on top of a service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DesignInfo {
    pub id: String,
    pub provider_id: String,
    pub name: String,
    pub price: Decimal,
    /// Portfolio image, owned by the media service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub is_active: bool,
}

/// Upsert design payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignUpsert {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}
