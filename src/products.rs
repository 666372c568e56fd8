//! Products
//!
//! Catalogue records as returned by the backend. The cart only ever keeps a snapshot of the
//! display fields; it never owns product data.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::discounts::price_after_discount;

/// Product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product identifier
    pub id: String,

    /// Product name
    pub name: String,

    /// Long-form description
    #[serde(default)]
    pub description: String,

    /// List price in rupees
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Catalogue discount in percent points (`15` for 15% off)
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub discount: Option<Decimal>,

    /// Primary image
    #[serde(default)]
    pub image: Option<String>,

    /// Gallery images
    #[serde(default)]
    pub images: Vec<String>,

    /// Owning category
    #[serde(default)]
    pub category_id: Option<String>,

    /// Units on hand, when the backend reports it
    #[serde(default)]
    pub stock_quantity: Option<u32>,

    /// Marketplaces the product is also listed on
    #[serde(default)]
    pub available_platforms: Vec<String>,

    /// Flagged as a new arrival
    #[serde(default)]
    pub is_new: bool,

    /// Stock keeping unit
    #[serde(default)]
    pub sku: Option<String>,
}

impl Product {
    /// Price after the catalogue discount, or the list price when there is none.
    ///
    /// A discount outside `0..=100` is ignored.
    #[must_use]
    pub fn discounted_price(&self) -> Decimal {
        match self.discount {
            Some(points) if points > Decimal::ZERO => price_after_discount(self.price, points)
                .unwrap_or_else(|error| {
                    warn!(product = %self.id, %error, "ignoring invalid product discount");

                    self.price
                }),
            _ => self.price,
        }
    }

    /// Image to display: the primary image, else the first gallery image.
    #[must_use]
    pub fn display_image(&self) -> Option<&str> {
        self.image
            .as_deref()
            .filter(|image| !image.is_empty())
            .or_else(|| self.images.first().map(String::as_str))
    }

    /// Whether any stock is on hand. Unknown stock counts as in stock.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock_quantity.is_none_or(|quantity| quantity > 0)
    }
}

/// Product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Category identifier
    pub id: String,

    /// Category name
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
}
