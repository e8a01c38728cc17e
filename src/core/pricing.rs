//! Pricing calculator.
//!
//! Pure functions only: no storage access, no clock reads. The caller passes `now` so the
//! promo eligibility check is deterministic. Arithmetic runs at full `Decimal` precision and
//! values are rounded to cents only when a [`PriceBreakdown`] is produced.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::{
    core::promo::check_eligibility,
    entities::{DiscountType, promo_code},
};

/// Result of pricing a party for a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceBreakdown {
    /// Price per person times party size
    pub base: Decimal,
    /// Discount granted, zero when no promo applied
    pub discount: Decimal,
    /// `base - discount`, may be negative for oversized fixed discounts
    pub total: Decimal,
    /// Normalized code of the promo that produced `discount`
    pub applied_code: Option<String>,
}

impl PriceBreakdown {
    /// Whether a promo was actually applied.
    #[must_use]
    pub const fn has_discount(&self) -> bool {
        self.applied_code.is_some()
    }
}

/// Rounds a monetary amount to two decimal places, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Discount a promo grants on `amount`, at full precision.
///
/// Percentage discounts scale with the amount and respect `max_discount_amount`; fixed
/// discounts are granted as-is regardless of party size.
#[must_use]
pub fn discount_for(promo: &promo_code::Model, amount: Decimal) -> Decimal {
    match promo.discount_type {
        DiscountType::Percentage => {
            let raw = amount * promo.discount_value / Decimal::ONE_HUNDRED;
            promo
                .max_discount_amount
                .map_or(raw, |cap| raw.min(cap))
        }
        DiscountType::Fixed => promo.discount_value,
    }
}

/// Prices a booking of `party_size` people at `unit_price` each.
///
/// An ineligible promo is ignored rather than rejected: the breakdown simply carries no
/// discount and no applied code.
#[must_use]
pub fn price(
    unit_price: Decimal,
    party_size: i32,
    promo: Option<&promo_code::Model>,
    now: DateTime<Utc>,
) -> PriceBreakdown {
    let base = unit_price * Decimal::from(party_size);

    let applied = promo.filter(|p| check_eligibility(p, base, now).is_ok());
    let discount = applied.map_or(Decimal::ZERO, |p| discount_for(p, base));
    let total = base - discount;

    PriceBreakdown {
        base: round_money(base),
        discount: round_money(discount),
        total: round_money(total),
        applied_code: applied.map(|p| p.code.clone()),
    }
}
