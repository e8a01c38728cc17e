//! Promo code entity - A discount rule with a validity window and an optional usage cap.
//!
//! Codes are stored upper-cased so lookups are case-insensitive. `used_count` is incremented
//! only inside the transaction of the booking that applied the code.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How the discount value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `discount_value` percent of the purchase, optionally capped
    #[sea_orm(string_value = "percentage")]
    Percentage,
    /// A flat amount, independent of party size
    #[sea_orm(string_value = "fixed")]
    Fixed,
}

/// Promo code database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promo_codes")]
pub struct Model {
    /// Unique identifier for the promo code
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Upper-cased code customers type in (e.g., "SAVE10")
    #[sea_orm(unique)]
    pub code: String,
    /// Optional marketing description
    pub description: Option<String>,
    /// Percentage or fixed
    pub discount_type: DiscountType,
    /// Percent (0-100) or flat amount depending on `discount_type`
    pub discount_value: Decimal,
    /// Purchases below this amount are not eligible
    pub min_purchase_amount: Decimal,
    /// Upper bound for percentage discounts, None for no cap
    pub max_discount_amount: Option<Decimal>,
    /// Maximum number of applications, None for unlimited
    pub usage_limit: Option<i32>,
    /// Number of bookings that applied this code
    pub used_count: i32,
    /// Start of the validity window (inclusive)
    pub valid_from: DateTimeUtc,
    /// End of the validity window (inclusive)
    pub valid_until: DateTimeUtc,
    /// Inactive codes behave as if they did not exist
    pub is_active: bool,
}

/// Promo codes are referenced from bookings by code text only
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
