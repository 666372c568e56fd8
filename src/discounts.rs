//! Discounts
//!
//! Percentage arithmetic shared by catalogue discounts and coupons. Percentages are expressed in
//! percent points at the edges (`20` for 20%) and converted to [`Percentage`] fractions internally.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Percent points outside `0..=100`.
    #[error("discount of {0}% is outside 0-100")]
    OutOfRange(Decimal),
}

/// Convert percent points (`20` for 20%) into a fractional [`Percentage`].
///
/// # Errors
///
/// Returns [`DiscountError::OutOfRange`] for negative values or values above 100.
pub fn percentage_from_points(points: Decimal) -> Result<Percentage, DiscountError> {
    if points.is_sign_negative() || points > Decimal::ONE_HUNDRED {
        return Err(DiscountError::OutOfRange(points));
    }

    Ok(Percentage::from(points / Decimal::ONE_HUNDRED))
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows or cannot be
/// represented in minor units.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage does not expose the inner Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Price left after taking `points` percent off `price`, rounded to whole paise.
///
/// # Errors
///
/// Returns a [`DiscountError`] if `points` is out of range or the multiplication overflows.
pub fn price_after_discount(price: Decimal, points: Decimal) -> Result<Decimal, DiscountError> {
    let percent = percentage_from_points(points)?;

    let off = (percent * Decimal::ONE)
        .checked_mul(price)
        .ok_or(DiscountError::PercentConversion)?;

    Ok((price - off).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}
