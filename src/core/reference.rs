//! Booking reference generation.
//!
//! References are a fixed prefix followed by random characters from an alphabet without
//! look-alike symbols (no `0`/`O`, `1`/`I`). Uniqueness is enforced by the database; the
//! booking engine retries on collision.

use rand::Rng;

use crate::config::BookingSettings;

const REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generates a new candidate booking reference.
#[must_use]
pub fn generate_reference(settings: &BookingSettings) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..settings.reference_length)
        .map(|_| char::from(REFERENCE_ALPHABET[rng.gen_range(0..REFERENCE_ALPHABET.len())]))
        .collect();
    format!("{}{suffix}", settings.reference_prefix)
}
