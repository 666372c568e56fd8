//! Pricing
//!
//! Pure price computation over cart lines, an optional coupon and an optional shipping method.
//! All arithmetic runs on [`Money`] in minor units; decimal rupee amounts only appear at the edges.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money, MoneyError,
    iso::{self, Currency},
};
use thiserror::Error;

use crate::{cart::CartItem, coupons::Coupon, discounts::DiscountError, shipping::ShippingMethod};

/// Store currency.
pub const CURRENCY: &Currency = iso::INR;

/// Errors that can occur while pricing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A decimal amount does not fit in minor units.
    #[error("amount {0} cannot be represented in minor units")]
    Unrepresentable(Decimal),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Wrapped percentage error.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// Convert a rupee amount into store-currency money, rounding to whole paise.
///
/// # Errors
///
/// Returns [`PricingError::Unrepresentable`] if the amount overflows minor units.
pub fn money(amount: Decimal) -> Result<Money<'static, Currency>, PricingError> {
    let minor = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|minor| minor.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|minor| minor.to_i64())
        .ok_or(PricingError::Unrepresentable(amount))?;

    Ok(Money::from_minor(minor, CURRENCY))
}

/// Convert money back into a rupee amount.
#[must_use]
pub fn amount(money: &Money<'_, Currency>) -> Decimal {
    Decimal::new(money.to_minor_units(), money.currency().exponent)
}

/// Zero in the store currency.
#[must_use]
pub fn zero() -> Money<'static, Currency> {
    Money::from_minor(0, CURRENCY)
}

/// Format an amount for display, e.g. `₹1,049.00`.
#[must_use]
pub fn format_price(money: &Money<'_, Currency>) -> String {
    money.to_string()
}

/// Sum of `unit price × quantity` over all lines.
///
/// # Errors
///
/// Returns a [`PricingError`] if an amount cannot be represented or money arithmetic fails.
pub fn subtotal(items: &[CartItem]) -> Result<Money<'static, Currency>, PricingError> {
    items.iter().try_fold(zero(), |acc, item| {
        Ok(acc.add(money(item.line_subtotal())?)?)
    })
}

/// Computed totals for a cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBreakdown {
    subtotal: Money<'static, Currency>,
    discount: Money<'static, Currency>,
    shipping_fee: Money<'static, Currency>,
    total: Money<'static, Currency>,
}

impl PriceBreakdown {
    /// Total cost of the lines before any coupon
    #[must_use]
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Coupon discount, never more than the subtotal
    #[must_use]
    pub fn discount(&self) -> Money<'static, Currency> {
        self.discount
    }

    /// Shipping fee after any free-shipping coupon
    #[must_use]
    pub fn shipping_fee(&self) -> Money<'static, Currency> {
        self.shipping_fee
    }

    /// Amount payable
    #[must_use]
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }
}

/// Price a cart.
///
/// `shipping` is `None` on the cart page, where no method has been chosen yet and no fee is
/// charged. A free-shipping coupon forces the fee to zero whatever the method.
///
/// # Errors
///
/// Returns a [`PricingError`] if an amount cannot be represented or money arithmetic fails.
pub fn price_cart(
    items: &[CartItem],
    coupon: Option<&Coupon>,
    shipping: Option<ShippingMethod>,
) -> Result<PriceBreakdown, PricingError> {
    let subtotal = subtotal(items)?;

    let discount = match coupon {
        Some(coupon) => coupon.discount_on(&subtotal)?,
        None => zero(),
    };

    let discount = if discount.to_minor_units() > subtotal.to_minor_units() {
        subtotal
    } else {
        discount
    };

    let shipping_fee = match shipping {
        Some(_) if coupon.is_some_and(Coupon::waives_shipping) => zero(),
        Some(method) => method.fee(),
        None => zero(),
    };

    let total = subtotal.sub(discount)?.add(shipping_fee)?;

    Ok(PriceBreakdown {
        subtotal,
        discount,
        shipping_fee,
        total,
    })
}
