/// Top-level `config.toml` loading
pub mod app;

/// Booking engine tunables
pub mod booking;

/// Catalog seed definitions (experiences, slots, promo codes)
pub mod catalog;

/// Database configuration and connection management
pub mod database;

pub use app::{AppConfig, load_config, load_default_config};
pub use booking::BookingSettings;
pub use database::DatabaseSettings;
