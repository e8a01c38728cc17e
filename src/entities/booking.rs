//! Booking entity - A confirmed reservation of seats in a slot.
//!
//! A booking row is only ever written together with the slot decrement and the promo usage
//! increment it caused. `booking_reference` is the identifier shared with customers and is
//! unique across all bookings.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "failed")]
    Failed,
}

/// Booking database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    /// Internal identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Customer who booked
    pub user_id: i64,
    /// Experience booked
    pub experience_id: i64,
    /// Slot whose capacity was consumed
    pub slot_id: i64,
    /// Customer-facing identifier (e.g., "BK7Q2MX4PA")
    #[sea_orm(unique)]
    pub booking_reference: String,
    /// Party size
    pub number_of_people: i32,
    /// Price per person times party size
    pub base_price: Decimal,
    /// Discount granted by `promo_code`, zero when none applied
    pub discount_amount: Decimal,
    /// `base_price - discount_amount`
    pub total_price: Decimal,
    /// Code actually applied, None when no discount was granted
    pub promo_code: Option<String>,
    /// Current state
    pub status: BookingStatus,
    /// Free-text notes from the customer
    pub special_requests: Option<String>,
    /// When the booking was committed
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Booking and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each booking belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    /// Each booking belongs to one experience
    #[sea_orm(
        belongs_to = "super::experience::Entity",
        from = "Column::ExperienceId",
        to = "super::experience::Column::Id"
    )]
    Experience,
    /// Each booking belongs to one slot
    #[sea_orm(
        belongs_to = "super::slot::Entity",
        from = "Column::SlotId",
        to = "super::slot::Column::Id"
    )]
    Slot,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::experience::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Experience.def()
    }
}

impl Related<super::slot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Slot.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
