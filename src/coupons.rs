//! Coupons
//!
//! Coupon codes are matched case-insensitively against a fixed table. At most one coupon is
//! applied at a time.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    discounts::{percent_of_minor, percentage_from_points},
    pricing::{CURRENCY, PricingError, money, zero},
};

/// How a coupon reduces the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponKind {
    /// Percentage off the subtotal.
    Percentage,

    /// Free shipping.
    Shipping,
}

/// Known coupons: code, kind, percent points, cap in rupees.
const KNOWN_COUPONS: [(&str, CouponKind, i64, Option<i64>); 3] = [
    ("SAVE10", CouponKind::Percentage, 10, None),
    ("WELCOME20", CouponKind::Percentage, 20, Some(500)),
    ("FREESHIP", CouponKind::Shipping, 0, None),
];

/// Coupon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Canonical (uppercase) code
    pub code: String,

    /// Discount kind
    #[serde(rename = "type")]
    pub kind: CouponKind,

    /// Percent points off the subtotal; zero for shipping coupons
    pub discount: Decimal,

    /// Upper bound on the discount amount in rupees
    #[serde(default)]
    pub max_discount: Option<Decimal>,
}

impl Coupon {
    /// Whether this coupon removes the shipping fee.
    #[must_use]
    pub fn waives_shipping(&self) -> bool {
        self.kind == CouponKind::Shipping
    }

    /// Discount granted on `subtotal`, capped at `max_discount`.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the percentage or the cap cannot be represented.
    pub fn discount_on(
        &self,
        subtotal: &Money<'_, Currency>,
    ) -> Result<Money<'static, Currency>, PricingError> {
        if self.kind == CouponKind::Shipping {
            return Ok(zero());
        }

        let percent = percentage_from_points(self.discount)?;
        let mut minor = percent_of_minor(&percent, subtotal.to_minor_units())?;

        if let Some(cap) = self.max_discount {
            minor = minor.min(money(cap)?.to_minor_units());
        }

        Ok(Money::from_minor(minor, CURRENCY))
    }
}

/// Look up a coupon by code, ignoring case and surrounding whitespace.
#[must_use]
pub fn find_coupon(code: &str) -> Option<Coupon> {
    let code = code.trim().to_uppercase();

    KNOWN_COUPONS
        .iter()
        .find(|(known, ..)| *known == code)
        .map(|&(known, kind, points, cap)| Coupon {
            code: known.to_string(),
            kind,
            discount: Decimal::from(points),
            max_discount: cap.map(Decimal::from),
        })
}

/// Why a coupon could not be applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CouponError {
    /// Nothing was entered.
    #[error("Please enter a coupon code")]
    Empty,

    /// The code is not in the coupon table.
    #[error("Invalid coupon code")]
    Invalid(String),
}

/// Coupon entry state for the cart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CouponState {
    applied: Option<Coupon>,
    error: Option<CouponError>,
}

impl CouponState {
    /// Apply `code`.
    ///
    /// A valid code replaces any applied coupon. An unknown code clears the applied coupon, so
    /// totals never keep a stale discount while an error is shown. An empty entry leaves the
    /// applied coupon alone.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::Empty`] for a blank code and [`CouponError::Invalid`] for an unknown
    /// one.
    pub fn apply(&mut self, code: &str) -> Result<&Coupon, CouponError> {
        let code = code.trim();

        if code.is_empty() {
            self.error = Some(CouponError::Empty);

            return Err(CouponError::Empty);
        }

        let Some(coupon) = find_coupon(code) else {
            let error = CouponError::Invalid(code.to_string());

            self.applied = None;
            self.error = Some(error.clone());

            return Err(error);
        };

        self.error = None;

        Ok(self.applied.insert(coupon))
    }

    /// Drop the applied coupon and any error.
    pub fn clear(&mut self) {
        self.applied = None;
        self.error = None;
    }

    /// Currently applied coupon
    #[must_use]
    pub fn applied(&self) -> Option<&Coupon> {
        self.applied.as_ref()
    }

    /// Error from the last attempt, if it failed
    #[must_use]
    pub fn error(&self) -> Option<&CouponError> {
        self.error.as_ref()
    }
}
