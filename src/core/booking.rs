//! Booking transaction engine.
//!
//! [`submit_booking`] is the only function in the crate that opens a transaction which
//! mutates slot capacity or promo usage. The request shape is validated first, then one
//! attempt runs entirely on that transaction:
//!
//! 1. Decrement capacity with a conditional update. Being the first statement, it takes the
//!    store's write lock, so a competing attempt queues here instead of failing mid-way.
//! 2. Load the experience (must be active) and the slot (must belong to it). If the
//!    decrement matched nothing, report why: the slot is closed or short of seats, or it has
//!    already started.
//! 3. Resolve the customer by email.
//! 4. Price the party, silently ignoring an ineligible promo, and consume the promo.
//! 5. Insert the booking and read it back with its summaries.
//!
//! Any failure rolls the whole attempt back, including the decrement. A collision on the booking reference is retried
//! with a fresh reference up to [`BookingSettings::max_reference_attempts`] times.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    DatabaseTransaction, Set, SqlErr, TransactionTrait, prelude::*, sea_query::Expr,
};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

use crate::{
    config::BookingSettings,
    core::{
        catalog::{get_active_experience, get_slot},
        pricing::{PriceBreakdown, price},
        promo::{consume_usage, find_active_promo_code},
        query::{BookingDetails, hydrate},
        reference::generate_reference,
        user::resolve_user,
    },
    entities::{BookingStatus, Slot, booking, promo_code, slot},
    errors::{Error, Resource, Result},
};

/// Inbound booking request.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookingRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    pub experience_id: i64,
    pub slot_id: i64,
    #[validate(range(min = 1, message = "At least one person is required"))]
    pub number_of_people: i32,
    #[serde(default)]
    pub promo_code: Option<String>,
    #[serde(default)]
    pub special_requests: Option<String>,
}

impl BookingRequest {
    /// Trims free-text fields; blank optionals become None.
    fn normalized(self) -> Self {
        let non_blank = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            promo_code: non_blank(self.promo_code),
            special_requests: non_blank(self.special_requests),
            ..self
        }
    }
}

/// Books seats in a slot.
///
/// # Errors
/// - `InvalidRequest` when required fields are missing or the email is malformed
/// - `NotFound` for an unknown or inactive experience, or a slot not belonging to it
/// - `InsufficientCapacity` when the slot is closed or has too few seats left
/// - `SlotExpired` when the slot has already started
/// - `ReferenceConflict` when every reference attempt collided
/// - `PersistenceFailure` for any storage error, after rolling back
#[instrument(
    skip(db, settings, request),
    fields(
        experience_id = request.experience_id,
        slot_id = request.slot_id,
        party = request.number_of_people
    )
)]
pub async fn submit_booking(
    db: &DatabaseConnection,
    settings: &BookingSettings,
    request: BookingRequest,
) -> Result<BookingDetails> {
    submit_booking_with_references(db, settings, request, || generate_reference(settings)).await
}

/// [`submit_booking`] with a caller-supplied reference generator.
pub async fn submit_booking_with_references<F>(
    db: &DatabaseConnection,
    settings: &BookingSettings,
    request: BookingRequest,
    mut next_reference: F,
) -> Result<BookingDetails>
where
    F: FnMut() -> String,
{
    let request = request.normalized();
    request.validate()?;

    let max_attempts = settings.max_reference_attempts.max(1);
    for attempt in 1..=max_attempts {
        let reference = next_reference();
        match attempt_booking(db, &request, &reference, attempt, Utc::now()).await {
            Ok(details) => {
                info!(
                    reference = %details.booking.booking_reference,
                    total = %details.booking.total_price,
                    promo = ?details.booking.promo_code,
                    "Booking confirmed"
                );
                return Ok(details);
            }
            Err(Error::ReferenceConflict { .. }) => {
                warn!(attempt, %reference, "Booking reference collision");
            }
            Err(e) => return Err(e),
        }
    }

    Err(Error::ReferenceConflict {
        attempts: max_attempts,
    })
}

/// Runs one attempt in its own transaction, committing on success and rolling back otherwise.
async fn attempt_booking(
    db: &DatabaseConnection,
    request: &BookingRequest,
    reference: &str,
    attempt: u32,
    now: DateTime<Utc>,
) -> Result<BookingDetails> {
    let txn = db.begin().await?;

    match book_in_transaction(&txn, request, reference, attempt, now).await {
        Ok(details) => {
            txn.commit().await?;
            Ok(details)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                error!(error = %rollback_err, "Failed to roll back booking attempt");
            }
            debug!(error = %e, attempt, "Booking attempt rolled back");
            Err(e)
        }
    }
}

async fn book_in_transaction(
    txn: &DatabaseTransaction,
    request: &BookingRequest,
    reference: &str,
    attempt: u32,
    now: DateTime<Utc>,
) -> Result<BookingDetails> {
    let party = request.number_of_people;

    // Must stay the first statement of the transaction
    let reserved = reserve_capacity(txn, request.slot_id, party, now).await?;

    let experience = get_active_experience(txn, request.experience_id)
        .await?
        .ok_or_else(|| Error::not_found(Resource::Experience, request.experience_id))?;

    let slot = get_slot(txn, request.slot_id)
        .await?
        .filter(|s| s.experience_id == experience.id)
        .ok_or_else(|| Error::not_found(Resource::Slot, request.slot_id))?;

    if !reserved {
        return Err(unreserved_reason(&slot, party, now));
    }

    let user = resolve_user(txn, &request.name, &request.email, &request.phone).await?;

    let promo = match request.promo_code.as_deref() {
        Some(code) => find_active_promo_code(txn, code).await?,
        None => None,
    };
    let pricing = price_and_consume(txn, experience.price, party, promo.as_ref(), now).await?;

    let booking = insert_booking(txn, request, user.id, reference, pricing, now)
        .await
        .map_err(|e| classify_insert_error(e, attempt))?;

    hydrate(txn, booking).await
}

/// Takes `party` seats from an open, future slot, closing it once no seats remain.
///
/// The decrement only applies while enough seats are left, so concurrent writers can never
/// drive `available_spots` below zero. Returns `false` when nothing was taken.
async fn reserve_capacity<C>(
    db: &C,
    slot_id: i64,
    party: i32,
    now: DateTime<Utc>,
) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = Slot::update_many()
        .col_expr(
            slot::Column::AvailableSpots,
            Expr::col(slot::Column::AvailableSpots).sub(party),
        )
        .filter(slot::Column::Id.eq(slot_id))
        .filter(slot::Column::IsAvailable.eq(true))
        .filter(slot::Column::AvailableSpots.gte(party))
        .filter(slot::Column::StartTime.gt(now))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Ok(false);
    }

    Slot::update_many()
        .col_expr(slot::Column::IsAvailable, Expr::value(false))
        .filter(slot::Column::Id.eq(slot_id))
        .filter(slot::Column::AvailableSpots.lte(0))
        .exec(db)
        .await?;

    Ok(true)
}

/// Why [`reserve_capacity`] took nothing from `slot`. Capacity is checked before start time.
fn unreserved_reason(slot: &slot::Model, party: i32, now: DateTime<Utc>) -> Error {
    let open = slot.is_available && slot.available_spots >= party;
    if open && slot.start_time <= now {
        Error::SlotExpired { slot_id: slot.id }
    } else {
        Error::InsufficientCapacity {
            requested: party,
            available: if slot.is_available {
                slot.available_spots.max(0)
            } else {
                0
            },
        }
    }
}

/// Prices the party and records the promo use.
///
/// If the promo's cap was reached after it was read, the party is repriced without it.
async fn price_and_consume<C>(
    db: &C,
    unit_price: Decimal,
    party: i32,
    promo: Option<&promo_code::Model>,
    now: DateTime<Utc>,
) -> Result<PriceBreakdown>
where
    C: ConnectionTrait,
{
    let pricing = price(unit_price, party, promo, now);
    let Some(promo) = promo else {
        return Ok(pricing);
    };

    if !pricing.has_discount() {
        debug!(code = %promo.code, "Promo code not eligible, booking at full price");
        return Ok(pricing);
    }
    if !consume_usage(db, promo.id).await? {
        warn!(code = %promo.code, "Promo code used up concurrently, booking at full price");
        return Ok(price(unit_price, party, None, now));
    }
    Ok(pricing)
}

async fn insert_booking(
    txn: &DatabaseTransaction,
    request: &BookingRequest,
    user_id: i64,
    reference: &str,
    pricing: PriceBreakdown,
    now: DateTime<Utc>,
) -> std::result::Result<booking::Model, DbErr> {
    booking::ActiveModel {
        user_id: Set(user_id),
        experience_id: Set(request.experience_id),
        slot_id: Set(request.slot_id),
        booking_reference: Set(reference.to_string()),
        number_of_people: Set(request.number_of_people),
        base_price: Set(pricing.base),
        discount_amount: Set(pricing.discount),
        total_price: Set(pricing.total),
        promo_code: Set(pricing.applied_code),
        status: Set(BookingStatus::Confirmed),
        special_requests: Set(request.special_requests.clone()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await
}

fn classify_insert_error(err: DbErr, attempt: u32) -> Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message))
            if message.contains("booking_reference") =>
        {
            Error::ReferenceConflict { attempts: attempt }
        }
        _ => Error::PersistenceFailure(err),
    }
}
