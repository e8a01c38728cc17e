//! Catalog store - Experiences and their slots.
//!
//! The booking engine only reads from the catalog; slot capacity is changed exclusively by
//! [`crate::core::booking`]. Creation functions exist for seeding and administration.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

use crate::{
    config::{
        AppConfig,
        catalog::{ExperienceConfig, PromoCodeConfig, SlotPlan},
    },
    core::promo::{self, NewPromoCode},
    entities::{Experience, Slot, experience, slot},
    errors::{Error, Result},
};

/// Fields needed to create an experience.
#[derive(Debug, Clone)]
pub struct NewExperience {
    pub title: String,
    pub description: String,
    pub location: String,
    pub price: Decimal,
    pub duration: String,
    pub category: String,
    pub image_url: String,
}

/// What [`seed_catalog`] inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub experiences: usize,
    pub slots: usize,
    pub promo_codes: usize,
}

/// Finds an experience that can currently be booked.
///
/// Returns None if the experience does not exist or has been deactivated.
pub async fn get_active_experience<C>(
    db: &C,
    experience_id: i64,
) -> Result<Option<experience::Model>>
where
    C: ConnectionTrait,
{
    let found = Experience::find_by_id(experience_id).one(db).await?;
    Ok(found.filter(|e| e.is_active))
}

/// Finds a slot by its unique ID.
pub async fn get_slot<C>(db: &C, slot_id: i64) -> Result<Option<slot::Model>>
where
    C: ConnectionTrait,
{
    Slot::find_by_id(slot_id).one(db).await.map_err(Into::into)
}

/// Lists the slots of an experience in chronological order.
pub async fn get_slots_for_experience(
    db: &DatabaseConnection,
    experience_id: i64,
) -> Result<Vec<slot::Model>> {
    Slot::find()
        .filter(slot::Column::ExperienceId.eq(experience_id))
        .order_by_asc(slot::Column::StartTime)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a new, active experience.
///
/// # Errors
/// Returns an error if the title is empty, the price is negative, or the insert fails.
pub async fn create_experience<C>(db: &C, new: NewExperience) -> Result<experience::Model>
where
    C: ConnectionTrait,
{
    if new.title.trim().is_empty() {
        return Err(Error::InvalidRequest {
            message: "Experience title cannot be empty".to_string(),
        });
    }
    if new.price.is_sign_negative() {
        return Err(Error::InvalidRequest {
            message: format!("Experience price cannot be negative: {}", new.price),
        });
    }

    let experience = experience::ActiveModel {
        title: Set(new.title.trim().to_string()),
        description: Set(new.description),
        location: Set(new.location),
        price: Set(new.price),
        duration: Set(new.duration),
        category: Set(new.category),
        image_url: Set(new.image_url),
        is_active: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    experience.insert(db).await.map_err(Into::into)
}

/// Creates an open slot with every seat available.
///
/// # Errors
/// Returns an error if the capacity is not positive, the window ends before it starts, or
/// the insert fails.
pub async fn create_slot<C>(
    db: &C,
    experience_id: i64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    max_capacity: i32,
) -> Result<slot::Model>
where
    C: ConnectionTrait,
{
    if max_capacity <= 0 {
        return Err(Error::InvalidRequest {
            message: format!("Slot capacity must be positive, got {max_capacity}"),
        });
    }
    if end_time <= start_time {
        return Err(Error::InvalidRequest {
            message: "Slot must end after it starts".to_string(),
        });
    }

    let slot = slot::ActiveModel {
        experience_id: Set(experience_id),
        start_time: Set(start_time),
        end_time: Set(end_time),
        max_capacity: Set(max_capacity),
        available_spots: Set(max_capacity),
        is_available: Set(true),
        ..Default::default()
    };
    slot.insert(db).await.map_err(Into::into)
}

/// Start/end pairs for a slot plan, one day at a time, starting the day after `now`.
#[must_use]
pub fn plan_slot_windows(
    plan: &SlotPlan,
    now: DateTime<Utc>,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let today = now.date_naive();
    (1..=i64::from(plan.days_ahead))
        .flat_map(|offset| {
            let day = today + Duration::days(offset);
            plan.start_hours.iter().filter_map(move |&hour| {
                let start = Utc.from_utc_datetime(&day.and_hms_opt(hour, 0, 0)?);
                Some((start, start + Duration::hours(i64::from(plan.duration_hours))))
            })
        })
        .collect()
}

impl From<ExperienceConfig> for NewExperience {
    fn from(config: ExperienceConfig) -> Self {
        Self {
            title: config.title,
            description: config.description,
            location: config.location,
            price: config.price,
            duration: config.duration,
            category: config.category,
            image_url: config.image_url,
        }
    }
}

impl PromoCodeConfig {
    /// Resolves the relative validity window against the seeding time.
    #[must_use]
    pub fn into_new_promo_code(self, now: DateTime<Utc>) -> NewPromoCode {
        NewPromoCode {
            code: self.code,
            description: self.description,
            discount_type: self.discount_type,
            discount_value: self.discount_value,
            min_purchase_amount: self.min_purchase_amount,
            max_discount_amount: self.max_discount_amount,
            usage_limit: self.usage_limit,
            valid_from: now,
            valid_until: now + Duration::days(self.valid_for_days),
        }
    }
}

/// Seeds experiences, their slots and promo codes from configuration.
///
/// Seeding runs in one transaction and is skipped entirely when the catalog already holds
/// experiences, so restarting the service never duplicates data.
#[instrument(skip(db, config))]
pub async fn seed_catalog(db: &DatabaseConnection, config: &AppConfig) -> Result<SeedSummary> {
    let existing = Experience::find().count(db).await?;
    if existing > 0 {
        info!(existing, "Catalog already populated, skipping seed");
        return Ok(SeedSummary::default());
    }

    let now = Utc::now();
    let mut summary = SeedSummary::default();
    let txn = db.begin().await?;

    for experience_config in &config.experiences {
        let plan = experience_config.slots.clone();
        let experience =
            create_experience(&txn, NewExperience::from(experience_config.clone())).await?;
        summary.experiences += 1;

        for (start, end) in plan_slot_windows(&plan, now) {
            create_slot(&txn, experience.id, start, end, plan.max_capacity).await?;
            summary.slots += 1;
        }
    }

    for promo_config in &config.promo_codes {
        promo::create_promo_code(&txn, promo_config.clone().into_new_promo_code(now)).await?;
        summary.promo_codes += 1;
    }

    txn.commit().await?;
    info!(
        experiences = summary.experiences,
        slots = summary.slots,
        promo_codes = summary.promo_codes,
        "Catalog seeded"
    );
    Ok(summary)
}
