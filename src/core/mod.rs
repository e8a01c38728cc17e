//! Framework-agnostic booking logic.
//!
//! Every function takes a connection and returns [`crate::errors::Result`]; nothing here
//! knows how requests arrive or how results are rendered.

/// Booking transaction engine
pub mod booking;
/// Experience and slot lookup, creation and seeding
pub mod catalog;
/// Price and discount computation
pub mod pricing;
/// Promo code lookup, eligibility, validation and usage accounting
pub mod promo;
/// Hydrated booking lookups
pub mod query;
/// Booking reference generation
pub mod reference;
/// Customer lookup and creation
pub mod user;
