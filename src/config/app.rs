//! Application configuration loading from `config.toml`.
//!
//! Every section is optional; a missing file section falls back to its defaults so a bare
//! deployment only needs `DATABASE_URL`.

use super::{
    booking::BookingSettings,
    catalog::{ExperienceConfig, PromoCodeConfig},
    database::DatabaseSettings,
};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Store connection settings
    #[serde(default)]
    pub database: DatabaseSettings,
    /// Engine tunables
    #[serde(default)]
    pub booking: BookingSettings,
    /// Experiences to seed into an empty catalog
    #[serde(default)]
    pub experiences: Vec<ExperienceConfig>,
    /// Promo codes to seed alongside the experiences
    #[serde(default)]
    pub promo_codes: Vec<PromoCodeConfig>,
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields of a seeded experience or promo code are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads configuration from `BOOKIT_CONFIG`, or `./config.toml` when unset.
///
/// A missing default file is not an error and yields the defaults.
pub fn load_default_config() -> Result<AppConfig> {
    if let Ok(path) = std::env::var("BOOKIT_CONFIG") {
        return load_config(path);
    }

    let default_path = Path::new("config.toml");
    if default_path.exists() {
        load_config(default_path)
    } else {
        tracing::info!("No config.toml found, using defaults");
        Ok(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::DiscountType;
    use rust_decimal::Decimal;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [database]
            url = "sqlite::memory:"

            [booking]
            reference_prefix = "BI"
            max_reference_attempts = 5

            [[experiences]]
            title = "Desert Safari"
            description = "Dune bashing and a camp dinner"
            location = "Dubai Desert, UAE"
            price = 89.99
            duration = "6 hours"
            category = "Adventure"
            image_url = "https://example.com/safari.jpg"

            [experiences.slots]
            days_ahead = 3
            start_hours = [10]

            [[promo_codes]]
            code = "SAVE10"
            discount_type = "percentage"
            discount_value = 10
            min_purchase_amount = 50
            max_discount_amount = 50
            usage_limit = 100
            valid_for_days = 90
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.booking.reference_prefix, "BI");
        assert_eq!(config.booking.reference_length, 8);
        assert_eq!(config.booking.max_reference_attempts, 5);

        assert_eq!(config.experiences.len(), 1);
        let safari = &config.experiences[0];
        assert_eq!(safari.price, Decimal::new(8999, 2));
        assert_eq!(safari.slots.days_ahead, 3);
        assert_eq!(safari.slots.start_hours, vec![10]);
        assert_eq!(safari.slots.max_capacity, 10);

        assert_eq!(config.promo_codes.len(), 1);
        let promo = &config.promo_codes[0];
        assert_eq!(promo.discount_type, DiscountType::Percentage);
        assert_eq!(promo.max_discount_amount, Some(Decimal::from(50)));
        assert_eq!(promo.usage_limit, Some(100));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.booking, BookingSettings::default());
        assert!(config.experiences.is_empty());
        assert!(config.promo_codes.is_empty());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
