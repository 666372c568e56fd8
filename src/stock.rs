//! Stock reconciliation
//!
//! Cart lines are checked against live stock before checkout. Any outstanding shortfall blocks the
//! way into checkout until the shopper reduces or removes the line.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::cart::CartItem;

/// Message recorded when the stock check itself could not be completed.
pub const STOCK_CHECK_FAILED: &str = "Stock check failed";

/// Result of a live stock check for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCheck {
    /// Whether the requested quantity can be fulfilled
    pub available: bool,

    /// Units currently on hand
    pub stock_quantity: u32,
}

impl StockCheck {
    /// Shortfall message for an unavailable check, `None` when the quantity can be fulfilled.
    #[must_use]
    pub fn shortfall(&self) -> Option<String> {
        (!self.available).then(|| format!("Only {} available", self.stock_quantity))
    }
}

/// Errors that keep the shopper out of checkout.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StockError {
    /// There is nothing to check out.
    #[error("Your cart is empty")]
    EmptyCart,

    /// One or more lines exceed the available stock.
    #[error("Please resolve stock issues before checkout: {}", .0.join(", "))]
    StockConflicts(SmallVec<[String; 2]>),
}

/// Outstanding stock messages, keyed by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockLedger {
    errors: FxHashMap<String, String>,
}

impl StockLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a stock check, replacing any earlier message for the product.
    pub fn record(&mut self, product_id: &str, check: StockCheck) {
        match check.shortfall() {
            Some(message) => {
                debug!(product = %product_id, %message, "stock shortfall");

                self.errors.insert(product_id.to_string(), message);
            }
            None => {
                self.errors.remove(product_id);
            }
        }
    }

    /// Record that the check for a product could not be completed.
    pub fn record_failure(&mut self, product_id: &str) {
        self.errors
            .insert(product_id.to_string(), STOCK_CHECK_FAILED.to_string());
    }

    /// Drop the message for a product, e.g. after its line was removed.
    pub fn forget(&mut self, product_id: &str) {
        self.errors.remove(product_id);
    }

    /// Message recorded for a product.
    #[must_use]
    pub fn error_for(&self, product_id: &str) -> Option<&str> {
        self.errors.get(product_id).map(String::as_str)
    }

    /// Whether no messages are outstanding.
    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fail while any message is outstanding.
    ///
    /// # Errors
    ///
    /// Returns [`StockError::StockConflicts`] naming every outstanding message, sorted by product id.
    pub fn ensure_clear(&self) -> Result<(), StockError> {
        if self.errors.is_empty() {
            return Ok(());
        }

        let mut conflicts: SmallVec<[(&String, &String); 2]> = self.errors.iter().collect();

        conflicts.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));

        Err(StockError::StockConflicts(
            conflicts
                .into_iter()
                .map(|(_, message)| message.clone())
                .collect(),
        ))
    }
}

/// Decide whether the shopper may enter checkout with `items`.
///
/// # Errors
///
/// Returns [`StockError::EmptyCart`] for an empty cart and [`StockError::StockConflicts`] while a
/// stock message is outstanding for any line in the cart.
pub fn checkout_gate(items: &[CartItem], ledger: &StockLedger) -> Result<(), StockError> {
    if items.is_empty() {
        return Err(StockError::EmptyCart);
    }

    let conflicts: SmallVec<[String; 2]> = items
        .iter()
        .filter_map(|item| ledger.error_for(&item.product_id))
        .map(ToString::to_string)
        .collect();

    if conflicts.is_empty() {
        Ok(())
    } else {
        Err(StockError::StockConflicts(conflicts))
    }
}
