//! Product Fixtures

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso;
use serde::Deserialize;

use crate::{fixtures::FixtureError, products::Product};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product id -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// Product description
    #[serde(default)]
    pub description: String,

    /// Product price (e.g., "1299.00 INR")
    pub price: String,

    /// Catalogue discount (e.g., "15%" or "0.15")
    #[serde(default)]
    pub discount: Option<String>,

    /// Units on hand
    #[serde(default)]
    pub stock: Option<u32>,

    /// Category id
    #[serde(default)]
    pub category: Option<String>,

    /// Primary image
    #[serde(default)]
    pub image: Option<String>,

    /// Marketplaces
    #[serde(default)]
    pub platforms: Vec<String>,

    /// New arrival flag
    #[serde(default)]
    pub new: bool,
}

impl ProductFixture {
    /// Build the catalogue product with the given id.
    ///
    /// # Errors
    ///
    /// Returns an error if the price or discount cannot be parsed.
    pub fn into_product(self, id: String) -> Result<Product, FixtureError> {
        let price = parse_price(&self.price)?;
        let discount = self.discount.as_deref().map(parse_percentage).transpose()?;

        Ok(Product {
            id,
            name: self.name,
            description: self.description,
            price,
            discount,
            image: self.image,
            images: Vec::new(),
            category_id: self.category,
            stock_quantity: self.stock,
            available_platforms: self.platforms,
            is_new: self.new,
            sku: None,
        })
    }
}

/// Parse a price string (e.g., "1299.00 INR") into a rupee amount.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if the amount is not a
/// decimal, or if the currency is not the store currency.
pub fn parse_price(s: &str) -> Result<Decimal, FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    if iso::find(code).is_none() {
        return Err(FixtureError::UnknownCurrency(code.to_string()));
    }

    if code != iso::INR.iso_alpha_code {
        return Err(FixtureError::CurrencyMismatch(
            iso::INR.iso_alpha_code.to_string(),
            code.to_string(),
        ));
    }

    amount
        .parse::<Decimal>()
        .map(|amount| amount.round_dp(2))
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))
}

/// Parse a percentage string into percent points.
///
/// Accepts two formats:
/// - Percentage format: "15%" for 15 points
/// - Decimal format: "0.15" for 15 points
///
/// # Errors
///
/// Returns an error if the string cannot be parsed.
pub fn parse_percentage(s: &str) -> Result<Decimal, FixtureError> {
    let trimmed = s.trim();

    if let Some(points) = trimmed.strip_suffix('%') {
        points
            .trim()
            .parse::<Decimal>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))
    } else {
        trimmed
            .parse::<Decimal>()
            .map(|fraction| fraction * Decimal::ONE_HUNDRED)
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("299INR");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_rejects_other_currencies() {
        let result = parse_price("2.99 GBP");

        assert!(matches!(
            result,
            Err(FixtureError::CurrencyMismatch(expected, found)) if expected == "INR" && found == "GBP"
        ));
    }

    #[test]
    fn parse_price_accepts_rupees() -> Result<(), FixtureError> {
        assert_eq!(parse_price("1299.00 INR")?, Decimal::from(1299));
        assert_eq!(parse_price("49.5 INR")?, Decimal::new(495, 1));

        Ok(())
    }

    #[test]
    fn parse_percentage_accepts_both_formats() -> Result<(), FixtureError> {
        assert_eq!(parse_percentage("15%")?, Decimal::from(15));
        assert_eq!(parse_percentage(" 0.2 ")?, Decimal::from(20));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_invalid_format() {
        let result = parse_percentage("lots");

        assert!(matches!(result, Err(FixtureError::InvalidPercentage(_))));
    }
}
