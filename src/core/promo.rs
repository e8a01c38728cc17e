//! Promo ledger - Promo code lookup, eligibility and usage accounting.
//!
//! Two entry points share [`check_eligibility`]:
//! - the booking engine prices through [`crate::core::pricing::price`], which silently drops
//!   an ineligible code;
//! - [`validate_promo_code`] answers "why won't this code apply?" and turns each failed
//!   check into an explicit error.
//!
//! `used_count` is only ever changed by [`consume_usage`], which the booking engine calls
//! inside its transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{Condition, QueryOrder, Set, prelude::*, sea_query::Expr};
use serde::Serialize;
use tracing::debug;

use crate::{
    core::pricing::{discount_for, round_money},
    entities::{DiscountType, PromoCode, promo_code},
    errors::{Error, Resource, Result},
};

/// Reason a promo code cannot be applied to a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    /// The code has been switched off
    Inactive,
    /// `now` falls outside `[valid_from, valid_until]`
    OutsideValidityWindow,
    /// `used_count` reached `usage_limit`
    UsageLimitReached,
    /// The purchase is smaller than `min_purchase_amount`
    BelowMinimum,
}

/// Quote returned by the standalone validation path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromoQuote {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub discount_amount: Decimal,
    pub original_amount: Decimal,
    pub final_amount: Decimal,
}

/// Fields needed to create a promo code.
#[derive(Debug, Clone)]
pub struct NewPromoCode {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_purchase_amount: Decimal,
    pub max_discount_amount: Option<Decimal>,
    pub usage_limit: Option<i32>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

/// Normalizes user input to the stored form of a code.
#[must_use]
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Checks every eligibility rule, in a fixed order, for a purchase of `amount` at `now`.
///
/// # Errors
/// Returns the first rule the promo fails.
pub fn check_eligibility(
    promo: &promo_code::Model,
    amount: Decimal,
    now: DateTime<Utc>,
) -> std::result::Result<(), Ineligibility> {
    if !promo.is_active {
        return Err(Ineligibility::Inactive);
    }
    if now < promo.valid_from || now > promo.valid_until {
        return Err(Ineligibility::OutsideValidityWindow);
    }
    if promo
        .usage_limit
        .is_some_and(|limit| promo.used_count >= limit)
    {
        return Err(Ineligibility::UsageLimitReached);
    }
    if amount < promo.min_purchase_amount {
        return Err(Ineligibility::BelowMinimum);
    }
    Ok(())
}

/// Finds an active promo code by its case-insensitive code.
///
/// Inactive codes are treated as unknown.
pub async fn find_active_promo_code<C>(db: &C, code: &str) -> Result<Option<promo_code::Model>>
where
    C: ConnectionTrait,
{
    PromoCode::find()
        .filter(promo_code::Column::Code.eq(normalize_code(code)))
        .filter(promo_code::Column::IsActive.eq(true))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all active promo codes, ordered by code.
pub async fn list_active_promo_codes(db: &DatabaseConnection) -> Result<Vec<promo_code::Model>> {
    PromoCode::find()
        .filter(promo_code::Column::IsActive.eq(true))
        .order_by_asc(promo_code::Column::Code)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Creates a new promo code, performing input validation.
///
/// # Errors
/// Returns an error if:
/// - The code is empty or whitespace-only
/// - The discount value or minimum purchase is negative
/// - A percentage discount exceeds 100
/// - A usage limit is given but not positive (omit it for unlimited use)
/// - The validity window ends before it starts
/// - The database insert fails (including a duplicate code)
pub async fn create_promo_code<C>(db: &C, new: NewPromoCode) -> Result<promo_code::Model>
where
    C: ConnectionTrait,
{
    let code = normalize_code(&new.code);
    if code.is_empty() {
        return Err(Error::InvalidRequest {
            message: "Promo code cannot be empty".to_string(),
        });
    }
    if new.discount_value.is_sign_negative() || new.min_purchase_amount.is_sign_negative() {
        return Err(Error::InvalidRequest {
            message: format!("Promo code {code} has a negative amount"),
        });
    }
    if new.discount_type == DiscountType::Percentage && new.discount_value > Decimal::ONE_HUNDRED {
        return Err(Error::InvalidRequest {
            message: format!("Promo code {code} discounts more than 100%"),
        });
    }
    if new.usage_limit.is_some_and(|limit| limit <= 0) {
        return Err(Error::InvalidRequest {
            message: format!("Promo code {code} needs a positive usage limit, or none"),
        });
    }
    if new.valid_until < new.valid_from {
        return Err(Error::InvalidRequest {
            message: format!("Promo code {code} expires before it starts"),
        });
    }

    let promo = promo_code::ActiveModel {
        code: Set(code),
        description: Set(new.description),
        discount_type: Set(new.discount_type),
        discount_value: Set(new.discount_value),
        min_purchase_amount: Set(new.min_purchase_amount),
        max_discount_amount: Set(new.max_discount_amount),
        usage_limit: Set(new.usage_limit),
        used_count: Set(0),
        valid_from: Set(new.valid_from),
        valid_until: Set(new.valid_until),
        is_active: Set(true),
        ..Default::default()
    };
    promo.insert(db).await.map_err(Into::into)
}

/// Validates a promo code against a purchase amount without consuming it.
///
/// # Errors
/// - `InvalidRequest` for an empty code or a negative amount
/// - `NotFound` when the code does not exist or is inactive
/// - `PromoExpired` outside the validity window
/// - `UsageLimitReached` when the cap is used up
/// - `BelowMinimum` when `amount` is under the minimum purchase
pub async fn validate_promo_code(
    db: &DatabaseConnection,
    code: &str,
    amount: Decimal,
) -> Result<PromoQuote> {
    if code.trim().is_empty() {
        return Err(Error::InvalidRequest {
            message: "Promo code and amount are required".to_string(),
        });
    }
    if amount.is_sign_negative() {
        return Err(Error::InvalidRequest {
            message: format!("Amount cannot be negative: {amount}"),
        });
    }

    let promo = find_active_promo_code(db, code)
        .await?
        .ok_or_else(|| Error::not_found(Resource::PromoCode, normalize_code(code)))?;

    check_eligibility(&promo, amount, Utc::now()).map_err(|reason| match reason {
        Ineligibility::Inactive => Error::not_found(Resource::PromoCode, &promo.code),
        Ineligibility::OutsideValidityWindow => Error::PromoExpired {
            code: promo.code.clone(),
        },
        Ineligibility::UsageLimitReached => Error::UsageLimitReached {
            code: promo.code.clone(),
        },
        Ineligibility::BelowMinimum => Error::BelowMinimum {
            minimum: promo.min_purchase_amount,
        },
    })?;

    let discount = discount_for(&promo, amount);
    Ok(PromoQuote {
        discount_amount: round_money(discount),
        original_amount: round_money(amount),
        final_amount: round_money(amount - discount),
        code: promo.code,
        description: promo.description,
        discount_type: promo.discount_type,
        discount_value: promo.discount_value,
    })
}

/// Records one application of a promo code, if its cap still allows it.
///
/// The increment is a single conditional `UPDATE`, so two concurrent callers can never push
/// `used_count` past `usage_limit`. Returns `false` when no row was updated, meaning the code
/// was used up or deactivated since it was read.
pub async fn consume_usage<C>(db: &C, promo_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = PromoCode::update_many()
        .col_expr(
            promo_code::Column::UsedCount,
            Expr::col(promo_code::Column::UsedCount).add(1),
        )
        .filter(promo_code::Column::Id.eq(promo_id))
        .filter(promo_code::Column::IsActive.eq(true))
        .filter(
            Condition::any()
                .add(promo_code::Column::UsageLimit.is_null())
                .add(
                    Expr::col(promo_code::Column::UsedCount)
                        .lt(Expr::col(promo_code::Column::UsageLimit)),
                ),
        )
        .exec(db)
        .await?;

    debug!(promo_id, rows = result.rows_affected, "Promo usage increment");
    Ok(result.rows_affected == 1)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_validate_promo_code_quote() -> Result<()> {
        let db = setup_test_db().await?;
        create_save10(&db).await?;

        let quote = validate_promo_code(&db, "save10", Decimal::from(200)).await?;
        assert_eq!(quote.code, "SAVE10");
        assert_eq!(quote.discount_type, DiscountType::Percentage);
        assert_eq!(quote.discount_amount, Decimal::from(20));
        assert_eq!(quote.original_amount, Decimal::from(200));
        assert_eq!(quote.final_amount, Decimal::from(180));

        Ok(())
    }

    #[tokio::test]
    async fn test_validate_promo_code_rejections() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();

        let result = validate_promo_code(&db, "NOPE", Decimal::from(100)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound {
                resource: Resource::PromoCode,
                ..
            }
        ));

        create_test_promo(
            &db,
            NewPromoCode {
                valid_from: now - Duration::days(30),
                valid_until: now - Duration::days(1),
                ..test_promo("OLD10", DiscountType::Percentage, 10)
            },
        )
        .await?;
        let result = validate_promo_code(&db, "OLD10", Decimal::from(100)).await;
        assert!(matches!(result.unwrap_err(), Error::PromoExpired { code } if code == "OLD10"));

        let capped = create_test_promo(
            &db,
            NewPromoCode {
                usage_limit: Some(1),
                ..test_promo("ONCE", DiscountType::Fixed, 5)
            },
        )
        .await?;
        assert!(consume_usage(&db, capped.id).await?);
        let result = validate_promo_code(&db, "ONCE", Decimal::from(100)).await;
        assert!(matches!(result.unwrap_err(), Error::UsageLimitReached { .. }));

        create_test_promo(
            &db,
            NewPromoCode {
                min_purchase_amount: Decimal::from(200),
                ..test_promo("FLAT100", DiscountType::Fixed, 100)
            },
        )
        .await?;
        let result = validate_promo_code(&db, "FLAT100", Decimal::from(150)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::BelowMinimum { minimum } if minimum == Decimal::from(200)
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_validate_promo_code_input_checks() -> Result<()> {
        // Nothing should reach the database
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = validate_promo_code(&db, "   ", Decimal::from(10)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidRequest { .. }));

        let result = validate_promo_code(&db, "SAVE10", Decimal::from(-10)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidRequest { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_inactive_code_is_unknown() -> Result<()> {
        let db = setup_test_db().await?;
        let promo = create_save10(&db).await?;

        let mut active: promo_code::ActiveModel = promo.into();
        active.is_active = Set(false);
        active.update(&db).await?;

        assert!(find_active_promo_code(&db, "SAVE10").await?.is_none());
        assert!(list_active_promo_codes(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_consume_usage_respects_limit() -> Result<()> {
        let db = setup_test_db().await?;
        let promo = create_test_promo(
            &db,
            NewPromoCode {
                usage_limit: Some(2),
                ..test_promo("TWICE", DiscountType::Fixed, 5)
            },
        )
        .await?;

        assert!(consume_usage(&db, promo.id).await?);
        assert!(consume_usage(&db, promo.id).await?);
        assert!(!consume_usage(&db, promo.id).await?);

        let stored = PromoCode::find_by_id(promo.id).one(&db).await?.unwrap();
        assert_eq!(stored.used_count, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_consume_usage_unlimited() -> Result<()> {
        let db = setup_test_db().await?;
        let promo = create_test_promo(&db, test_promo("ALWAYS", DiscountType::Fixed, 5)).await?;

        for _ in 0..5 {
            assert!(consume_usage(&db, promo.id).await?);
        }
        let stored = PromoCode::find_by_id(promo.id).one(&db).await?.unwrap();
        assert_eq!(stored.used_count, 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_promo_code_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_promo_code(&db, test_promo("  ", DiscountType::Fixed, 5)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidRequest { .. }));

        let result =
            create_promo_code(&db, test_promo("HUGE", DiscountType::Percentage, 150)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidRequest { .. }));

        let zero_limit = NewPromoCode {
            usage_limit: Some(0),
            ..test_promo("NOUSE", DiscountType::Fixed, 5)
        };
        let result = create_promo_code(&db, zero_limit).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidRequest { .. }));

        let now = Utc::now();
        let backwards = NewPromoCode {
            valid_from: now,
            valid_until: now - Duration::days(1),
            ..test_promo("BACKWARDS", DiscountType::Fixed, 5)
        };
        let result = create_promo_code(&db, backwards).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidRequest { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_codes_are_normalized() -> Result<()> {
        let db = setup_test_db().await?;
        let promo = create_test_promo(&db, test_promo(" welcome20 ", DiscountType::Percentage, 20))
            .await?;
        assert_eq!(promo.code, "WELCOME20");
        assert!(find_active_promo_code(&db, "Welcome20").await?.is_some());
        Ok(())
    }

    #[test]
    fn test_check_eligibility_order() {
        let now = Utc::now();
        let promo = promo_code::Model {
            id: 1,
            code: "SAVE10".to_string(),
            description: None,
            discount_type: DiscountType::Percentage,
            discount_value: Decimal::from(10),
            min_purchase_amount: Decimal::from(50),
            max_discount_amount: None,
            usage_limit: Some(1),
            used_count: 1,
            valid_from: now - Duration::days(2),
            valid_until: now - Duration::days(1),
            is_active: true,
        };

        // Window is checked before usage and minimum
        assert_eq!(
            check_eligibility(&promo, Decimal::from(10), now),
            Err(Ineligibility::OutsideValidityWindow)
        );
        assert_eq!(
            check_eligibility(&promo, Decimal::from(10), now - Duration::hours(36)),
            Err(Ineligibility::UsageLimitReached)
        );
    }
}
