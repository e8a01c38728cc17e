//! Slot entity - A time window of an experience with finite capacity.
//!
//! `available_spots` and `is_available` are written only by the booking engine. The
//! invariant is `0 <= available_spots <= max_capacity`, and `is_available` turns false once
//! the slot is full.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Slot database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "slots")]
pub struct Model {
    /// Unique identifier for the slot
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Experience this slot belongs to
    pub experience_id: i64,
    /// Start of the window
    pub start_time: DateTimeUtc,
    /// End of the window
    pub end_time: DateTimeUtc,
    /// Total seats in the slot
    pub max_capacity: i32,
    /// Seats not yet booked
    pub available_spots: i32,
    /// Whether the slot can still take bookings
    pub is_available: bool,
}

/// Defines relationships between Slot and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each slot belongs to one experience
    #[sea_orm(
        belongs_to = "super::experience::Entity",
        from = "Column::ExperienceId",
        to = "super::experience::Column::Id"
    )]
    Experience,
    /// One slot has many bookings
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
}

impl Related<super::experience::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Experience.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
