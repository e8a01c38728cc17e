//! Shared test utilities for the booking engine.
//!
//! This module provides common helper functions for setting up test databases
//! and creating catalog records and promo codes with sensible defaults.

use crate::{
    core::{
        booking::BookingRequest,
        catalog::{self, NewExperience},
        promo::{self, NewPromoCode},
    },
    entities::{self, DiscountType},
    errors::Result,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, DatabaseConnection};
use std::{
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};

static FILE_DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Creates an in-memory `SQLite` database with all tables initialized.
///
/// The pool holds a single connection: every connection to `sqlite::memory:` is a separate
/// database, and concurrent engine calls then queue for it like writers on a locked file.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = sea_orm::Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// A file-backed test database, deleted on drop.
pub struct FileTestDb {
    pub db: DatabaseConnection,
    path: PathBuf,
}

impl Drop for FileTestDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

/// Creates a temporary `SQLite` file database behind a multi-connection pool.
///
/// Goes through [`crate::config::database::create_connection`], so concurrent engine calls
/// contend for the store's write lock the way they do in production.
pub async fn setup_file_test_db() -> Result<FileTestDb> {
    let path = std::env::temp_dir().join(format!(
        "bookit-test-{}-{}.sqlite",
        std::process::id(),
        FILE_DB_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    let _ = std::fs::remove_file(&path);

    let settings = crate::config::DatabaseSettings {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        max_connections: 5,
        ..Default::default()
    };
    let db = crate::config::database::create_connection(&settings).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(FileTestDb { db, path })
}

/// Experience fields used by [`create_test_experience`].
pub fn test_experience(price: Decimal) -> NewExperience {
    NewExperience {
        title: "Harbour kayak tour".to_string(),
        description: "Paddle past the old lighthouse".to_string(),
        location: "Lisbon, Portugal".to_string(),
        price,
        duration: "2 hours".to_string(),
        category: "Water Sports".to_string(),
        image_url: "https://example.com/kayak.jpg".to_string(),
    }
}

/// Creates an active experience priced at `price` per person.
pub async fn create_test_experience(
    db: &DatabaseConnection,
    price: Decimal,
) -> Result<entities::experience::Model> {
    catalog::create_experience(db, test_experience(price)).await
}

/// Creates an open slot starting tomorrow with `capacity` seats.
pub async fn create_test_slot(
    db: &DatabaseConnection,
    experience_id: i64,
    capacity: i32,
) -> Result<entities::slot::Model> {
    let start = Utc::now() + Duration::days(1);
    catalog::create_slot(db, experience_id, start, start + Duration::hours(2), capacity).await
}

/// Promo code fields with sensible defaults.
///
/// # Defaults
/// * no minimum purchase, no cap, no usage limit
/// * valid from yesterday until 30 days from now
pub fn test_promo(code: &str, discount_type: DiscountType, value: i64) -> NewPromoCode {
    let now = Utc::now();
    NewPromoCode {
        code: code.to_string(),
        description: None,
        discount_type,
        discount_value: Decimal::from(value),
        min_purchase_amount: Decimal::ZERO,
        max_discount_amount: None,
        usage_limit: None,
        valid_from: now - Duration::days(1),
        valid_until: now + Duration::days(30),
    }
}

/// Creates a promo code from explicit fields.
pub async fn create_test_promo(
    db: &DatabaseConnection,
    new: NewPromoCode,
) -> Result<entities::promo_code::Model> {
    promo::create_promo_code(db, new).await
}

/// Creates `SAVE10`: 10% off, capped at 50, minimum purchase 50, 100 uses.
pub async fn create_save10(db: &DatabaseConnection) -> Result<entities::promo_code::Model> {
    create_test_promo(
        db,
        NewPromoCode {
            description: Some("10% off your booking".to_string()),
            min_purchase_amount: Decimal::from(50),
            max_discount_amount: Some(Decimal::from(50)),
            usage_limit: Some(100),
            ..test_promo("SAVE10", DiscountType::Percentage, 10)
        },
    )
    .await
}

/// A valid booking request from "Test Guest" without a promo code.
pub fn booking_request(experience_id: i64, slot_id: i64, number_of_people: i32) -> BookingRequest {
    BookingRequest {
        name: "Test Guest".to_string(),
        email: "guest@example.com".to_string(),
        phone: "555-0100".to_string(),
        experience_id,
        slot_id,
        number_of_people,
        promo_code: None,
        special_requests: None,
    }
}
