//! Fixtures
//!
//! YAML catalogue fixtures for demos and tests.

use std::{fs, path::PathBuf};

use thiserror::Error;

use crate::products::Product;

pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Price not in the store currency
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Same product id defined twice
    #[error("Duplicate product: {0}")]
    DuplicateProduct(String),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Loaded products, in id order per file
    products: Vec<Product>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            products: Vec::new(),
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a price or discount is invalid, or
    /// if a product id is already loaded.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: products::ProductsFixture = serde_norway::from_str(&contents)?;

        let mut entries: Vec<_> = fixture.products.into_iter().collect();

        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (id, product_fixture) in entries {
            if self.products.iter().any(|product| product.id == id) {
                return Err(FixtureError::DuplicateProduct(id));
            }

            self.products.push(product_fixture.into_product(id)?);
        }

        Ok(self)
    }

    /// All loaded products
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by id
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::ProductNotFound`] if no product has that id.
    pub fn product(&self, id: &str) -> Result<&Product, FixtureError> {
        self.products
            .iter()
            .find(|product| product.id == id)
            .ok_or_else(|| FixtureError::ProductNotFound(id.to_string()))
    }
}
