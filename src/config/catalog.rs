//! Catalog seed configuration loaded from `config.toml`.
//!
//! Experiences list the parameters used to generate their slots; promo codes carry a
//! validity length relative to the moment of seeding rather than absolute dates.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::entities::DiscountType;

/// One `[[experiences]]` entry
#[derive(Debug, Deserialize, Clone)]
pub struct ExperienceConfig {
    pub title: String,
    pub description: String,
    pub location: String,
    /// Price per person
    pub price: Decimal,
    pub duration: String,
    pub category: String,
    pub image_url: String,
    /// Slot generation parameters
    #[serde(default)]
    pub slots: SlotPlan,
}

/// How slots are generated for an experience
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SlotPlan {
    /// Number of days, starting tomorrow, that receive slots
    pub days_ahead: u32,
    /// Start hours (UTC) of each daily slot
    pub start_hours: Vec<u32>,
    /// Length of each slot in hours
    pub duration_hours: u32,
    /// Seats per slot
    pub max_capacity: i32,
}

impl Default for SlotPlan {
    fn default() -> Self {
        Self {
            days_ahead: 7,
            start_hours: vec![9, 14, 18],
            duration_hours: 2,
            max_capacity: 10,
        }
    }
}

/// One `[[promo_codes]]` entry
#[derive(Debug, Deserialize, Clone)]
pub struct PromoCodeConfig {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[serde(default)]
    pub min_purchase_amount: Decimal,
    #[serde(default)]
    pub max_discount_amount: Option<Decimal>,
    #[serde(default)]
    pub usage_limit: Option<i32>,
    /// Validity window length, starting at seeding time
    pub valid_for_days: i64,
}
