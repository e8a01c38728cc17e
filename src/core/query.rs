//! Booking query service - read-only, hydrated booking lookups.

use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, prelude::*};
use serde::Serialize;

use crate::{
    core::user::find_user_by_email,
    entities::{Booking, Experience, Slot, User, booking, experience, slot, user},
    errors::{Error, Resource, Result},
};

/// Experience fields shown alongside a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExperienceSummary {
    pub id: i64,
    pub title: String,
    pub location: String,
    pub duration: String,
    pub image_url: String,
    pub category: String,
}

/// Slot window shown alongside a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotSummary {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Customer fields shown alongside a booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A booking joined with its experience, slot and customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: booking::Model,
    pub experience: ExperienceSummary,
    pub slot: SlotSummary,
    pub user: UserSummary,
}

impl From<experience::Model> for ExperienceSummary {
    fn from(e: experience::Model) -> Self {
        Self {
            id: e.id,
            title: e.title,
            location: e.location,
            duration: e.duration,
            image_url: e.image_url,
            category: e.category,
        }
    }
}

impl From<slot::Model> for SlotSummary {
    fn from(s: slot::Model) -> Self {
        Self {
            id: s.id,
            start_time: s.start_time,
            end_time: s.end_time,
        }
    }
}

impl From<user::Model> for UserSummary {
    fn from(u: user::Model) -> Self {
        Self {
            name: u.name,
            email: u.email,
            phone: u.phone,
        }
    }
}

/// Joins a booking with the records it references.
///
/// # Errors
/// Returns `PersistenceFailure` if a referenced row is missing, which would mean the store's
/// foreign keys were bypassed.
pub async fn hydrate<C>(db: &C, booking: booking::Model) -> Result<BookingDetails>
where
    C: ConnectionTrait,
{
    let experience = Experience::find_by_id(booking.experience_id)
        .one(db)
        .await?
        .ok_or_else(|| missing_row("experience", booking.experience_id))?;
    let slot = Slot::find_by_id(booking.slot_id)
        .one(db)
        .await?
        .ok_or_else(|| missing_row("slot", booking.slot_id))?;
    let user = User::find_by_id(booking.user_id)
        .one(db)
        .await?
        .ok_or_else(|| missing_row("user", booking.user_id))?;

    Ok(BookingDetails {
        booking,
        experience: experience.into(),
        slot: slot.into(),
        user: user.into(),
    })
}

fn missing_row(table: &str, id: i64) -> Error {
    Error::PersistenceFailure(DbErr::RecordNotFound(format!(
        "booking references missing {table} {id}"
    )))
}

/// Fetches a booking by its customer-facing reference.
///
/// # Errors
/// Returns `NotFound(Booking)` if no booking carries `reference`.
pub async fn get_booking_by_reference(
    db: &DatabaseConnection,
    reference: &str,
) -> Result<BookingDetails> {
    let reference = reference.trim();
    let booking = Booking::find()
        .filter(booking::Column::BookingReference.eq(reference))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(Resource::Booking, reference))?;

    hydrate(db, booking).await
}

/// Lists a customer's bookings, most recent first.
///
/// # Errors
/// Returns `NotFound(User)` if no customer is registered under `email`.
pub async fn get_bookings_for_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Vec<BookingDetails>> {
    let user = find_user_by_email(db, email)
        .await?
        .ok_or_else(|| Error::not_found(Resource::User, email.trim()))?;

    let bookings = Booking::find()
        .filter(booking::Column::UserId.eq(user.id))
        .order_by_desc(booking::Column::CreatedAt)
        .order_by_desc(booking::Column::Id)
        .all(db)
        .await?;

    let mut details = Vec::with_capacity(bookings.len());
    for booking in bookings {
        details.push(hydrate(db, booking).await?);
    }
    Ok(details)
}
