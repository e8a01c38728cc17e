//! Experience entity - A bookable offering such as a guided tour.
//!
//! Experiences are read-only from the booking engine's point of view; only their price and
//! active flag take part in a booking.

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Experience database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "experiences")]
pub struct Model {
    /// Unique identifier for the experience
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display title (e.g., "Desert Safari")
    pub title: String,
    /// Long-form description
    pub description: String,
    /// Where the experience takes place
    pub location: String,
    /// Price per person
    pub price: Decimal,
    /// Human-readable duration (e.g., "6 hours")
    pub duration: String,
    /// Category used for browsing (e.g., "Adventure")
    pub category: String,
    /// Cover image
    pub image_url: String,
    /// Inactive experiences cannot be booked
    pub is_active: bool,
    /// When the experience was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Experience and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One experience has many slots
    #[sea_orm(has_many = "super::slot::Entity")]
    Slots,
    /// One experience has many bookings
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
}

impl Related<super::slot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Slots.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
