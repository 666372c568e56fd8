//! Shipping

use std::{fmt, str::FromStr};

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::CURRENCY;

/// A shipping tier offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingTier {
    /// Display name.
    pub label: &'static str,

    /// Delivery estimate shown next to the option.
    pub estimate: &'static str,

    /// Fee in paise.
    pub fee_minor: i64,
}

const STANDARD: ShippingTier = ShippingTier {
    label: "Standard Delivery",
    estimate: "3-5 business days",
    fee_minor: 49_00,
};

const EXPRESS: ShippingTier = ShippingTier {
    label: "Express Delivery",
    estimate: "1-2 business days",
    fee_minor: 99_00,
};

const OVERNIGHT: ShippingTier = ShippingTier {
    label: "Overnight Delivery",
    estimate: "Next business day",
    fee_minor: 199_00,
};

/// Shipping method selected at checkout. `Standard` is pre-selected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingMethod {
    /// 3-5 business days.
    #[default]
    Standard,

    /// 1-2 business days.
    Express,

    /// Next business day.
    Overnight,
}

/// Unknown shipping method name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown shipping method: {0}")]
pub struct UnknownShippingMethod(pub String);

impl ShippingMethod {
    /// Every method, in display order.
    pub const ALL: [ShippingMethod; 3] = [
        ShippingMethod::Standard,
        ShippingMethod::Express,
        ShippingMethod::Overnight,
    ];

    /// Tier details for this method.
    #[must_use]
    pub const fn tier(self) -> &'static ShippingTier {
        match self {
            ShippingMethod::Standard => &STANDARD,
            ShippingMethod::Express => &EXPRESS,
            ShippingMethod::Overnight => &OVERNIGHT,
        }
    }

    /// Fee charged for this method before any coupon.
    #[must_use]
    pub fn fee(self) -> Money<'static, Currency> {
        Money::from_minor(self.tier().fee_minor, CURRENCY)
    }

    /// Wire name (`standard`, `express`, `overnight`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ShippingMethod::Standard => "standard",
            ShippingMethod::Express => "express",
            ShippingMethod::Overnight => "overnight",
        }
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShippingMethod {
    type Err = UnknownShippingMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShippingMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownShippingMethod(s.to_string()))
    }
}
