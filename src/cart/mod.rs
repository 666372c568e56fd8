//! Cart
//!
//! [`CartStore`] is the single owner of the persisted cart. Every reader goes through it, every
//! mutation rewrites the whole list in storage and returns the new list, and subscribers are told
//! about each change.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{products::Product, storage::KeyValueStore};

mod observers;

pub use observers::SubscriptionKey;

use observers::Observers;

/// Storage key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// A cart line: a snapshot of the product's display fields plus a quantity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Line identifier, generated when the line is created
    pub id: Uuid,

    /// Referenced product
    pub product_id: String,

    /// Product name at the time of adding
    pub name: String,

    /// List price at the time of adding
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Price after the catalogue discount at the time of adding
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub discounted_price: Option<Decimal>,

    /// Product image at the time of adding
    #[serde(default)]
    pub image: Option<String>,

    /// Units, always at least one
    pub quantity: u32,

    /// `quantity × unit price`
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
}

impl CartItem {
    fn from_product(product: &Product, quantity: u32) -> Self {
        let mut item = CartItem {
            id: Uuid::new_v4(),
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            discounted_price: Some(product.discounted_price()),
            image: product.display_image().map(ToString::to_string),
            quantity,
            subtotal: Decimal::ZERO,
        };

        item.refresh_subtotal();
        item
    }

    /// Price charged per unit: the discounted price, else the list price.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.discounted_price.unwrap_or(self.price)
    }

    /// `quantity × unit price`, computed fresh.
    #[must_use]
    pub fn line_subtotal(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity)
    }

    /// Recompute the stored subtotal from the current quantity.
    pub fn refresh_subtotal(&mut self) {
        self.subtotal = self.line_subtotal();
    }
}

/// Cart store backed by durable key-value storage.
///
/// Durability is best effort: a failed write is logged and the new list is still returned and
/// broadcast, so the caller can keep rendering.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    observers: Observers,
}

impl<S: KeyValueStore> CartStore<S> {
    /// Create a store over `storage`.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            observers: Observers::default(),
        }
    }

    /// Underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read the cart from storage.
    ///
    /// Missing data reads as an empty cart. Corrupt data is logged, removed from storage and also
    /// reads as an empty cart. Subtotals are recomputed on every read and lines with a zero
    /// quantity are dropped.
    pub fn get_cart(&self) -> Vec<CartItem> {
        let raw = match self.storage.get(CART_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(source) => {
                error!(%source, "failed to read cart from storage");

                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<CartItem>>(&raw) {
            Ok(items) => items
                .into_iter()
                .filter(|item| item.quantity > 0)
                .map(|mut item| {
                    item.refresh_subtotal();
                    item
                })
                .collect(),
            Err(source) => {
                warn!(%source, "discarding corrupt cart data");

                if let Err(source) = self.storage.remove(CART_KEY) {
                    error!(%source, "failed to discard corrupt cart data");
                }

                Vec::new()
            }
        }
    }

    /// Add `quantity` units of `product`.
    ///
    /// Merges into the existing line for the same product, otherwise creates a new line with a
    /// snapshot of the product. Adding zero units changes nothing.
    pub fn add_to_cart(&self, product: &Product, quantity: u32) -> Vec<CartItem> {
        let mut items = self.get_cart();

        if quantity == 0 {
            debug!(product = %product.id, "ignoring add of zero units");

            return items;
        }

        match items.iter_mut().find(|item| item.product_id == product.id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(quantity);
                item.refresh_subtotal();
            }
            None => items.push(CartItem::from_product(product, quantity)),
        }

        debug!(product = %product.id, quantity, "added to cart");

        self.persist(items)
    }

    /// Remove every line for `product_id`.
    pub fn remove_from_cart(&self, product_id: &str) -> Vec<CartItem> {
        let mut items = self.get_cart();
        let before = items.len();

        items.retain(|item| item.product_id != product_id);

        if items.len() == before {
            return items;
        }

        debug!(product = %product_id, "removed from cart");

        self.persist(items)
    }

    /// Set the quantity of the line for `product_id`.
    ///
    /// A quantity of zero or less removes the line. Unknown products are ignored.
    pub fn update_cart_item_quantity(&self, product_id: &str, quantity: i64) -> Vec<CartItem> {
        if quantity <= 0 {
            return self.remove_from_cart(product_id);
        }

        let mut items = self.get_cart();

        let Some(item) = items.iter_mut().find(|item| item.product_id == product_id) else {
            return items;
        };

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

        if item.quantity == quantity {
            return items;
        }

        item.quantity = quantity;
        item.refresh_subtotal();

        debug!(product = %product_id, quantity, "updated cart quantity");

        self.persist(items)
    }

    /// Empty the cart.
    pub fn clear_cart(&self) {
        debug!("clearing cart");

        self.persist(Vec::new());
    }

    /// Sum of all line subtotals.
    pub fn cart_total(&self) -> Decimal {
        self.get_cart().iter().map(CartItem::line_subtotal).sum()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> u32 {
        self.get_cart()
            .iter()
            .fold(0, |count, item| count.saturating_add(item.quantity))
    }

    /// Register a listener called with the new lines after every mutation.
    pub fn subscribe(
        &self,
        listener: impl Fn(&[CartItem]) + Send + Sync + 'static,
    ) -> SubscriptionKey {
        self.observers.subscribe(Arc::new(listener))
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, key: SubscriptionKey) -> bool {
        self.observers.unsubscribe(key)
    }

    fn persist(&self, items: Vec<CartItem>) -> Vec<CartItem> {
        match serde_json::to_string(&items) {
            Ok(raw) => {
                if let Err(source) = self.storage.set(CART_KEY, &raw) {
                    error!(%source, "failed to persist cart");
                }
            }
            Err(source) => error!(%source, "failed to serialize cart"),
        }

        self.observers.notify(&items);

        items
    }
}
