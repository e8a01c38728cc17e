//! Booking engine settings, the `[booking]` section of `config.toml`.

use serde::Deserialize;

/// Tunables for reference generation and conflict handling.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BookingSettings {
    /// Leading letters of every booking reference
    pub reference_prefix: String,
    /// Number of random characters after the prefix
    pub reference_length: usize,
    /// Total attempts before a reference collision is reported to the caller
    pub max_reference_attempts: u32,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            reference_prefix: "BK".to_string(),
            reference_length: 8,
            max_reference_attempts: 3,
        }
    }
}
