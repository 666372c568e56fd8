//! Cart page controller.
//!
//! Mirrors what the shopper sees on the cart page: the lines, their stock messages, which lines
//! have a quantity change in flight, the coupon box and transient notices. Every method takes
//! `&self`, so a second click that arrives while a stock check is still pending is seen and
//! rejected rather than queued.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use jiff::Timestamp;
use rustc_hash::FxHashSet;
use storefront::{
    cart::{CartItem, CartStore},
    coupons::{Coupon, CouponError, CouponState},
    pricing::{PriceBreakdown, PricingError, price_cart},
    stock::{StockError, StockLedger, checkout_gate},
    storage::KeyValueStore,
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::{
    api::{ApiError, InventoryService},
    notices::{
        CART_EMPTY, COUPON_APPLIED, ITEM_REMOVED, Notices, QUANTITY_UPDATE_FAILED,
        RESOLVE_STOCK_ISSUES,
    },
};

/// Errors from cart page actions.
#[derive(Debug, Error)]
pub enum CartPageError {
    /// Quantities below one are ignored; removal is a separate action.
    #[error("quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),

    /// A quantity change for this line is already in flight.
    #[error("quantity change already in progress for {0}")]
    Busy(String),

    /// Not enough stock for the requested quantity.
    #[error("{message}")]
    Unavailable {
        /// Product that ran short
        product_id: String,

        /// Shortfall message shown next to the line
        message: String,
    },

    /// The stock check could not be completed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// What the checkout starts from.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSeed {
    /// Cart lines at the moment the shopper left the cart page
    pub items: Vec<CartItem>,

    /// Coupon applied on the cart page
    pub coupon: Option<Coupon>,
}

#[derive(Debug, Default)]
struct View {
    items: Vec<CartItem>,
    ledger: StockLedger,
    coupon: CouponState,
    updating: FxHashSet<String>,
    notices: Notices,
}

impl View {
    fn settle_stock_notice(&mut self) {
        if self.ledger.is_clear() {
            self.notices.dismiss(RESOLVE_STOCK_ISSUES);
        }
    }
}

/// Cart page state and actions.
#[derive(Debug)]
pub struct CartPage<S, I> {
    cart: Arc<CartStore<S>>,
    inventory: I,
    view: Mutex<View>,
}

impl<S: KeyValueStore, I: InventoryService> CartPage<S, I> {
    /// Create the page. Nothing is read until [`CartPage::load`].
    pub fn new(cart: Arc<CartStore<S>>, inventory: I) -> Self {
        Self {
            cart,
            inventory,
            view: Mutex::new(View::default()),
        }
    }

    /// Read the cart fresh and check stock for every line, one at a time.
    pub async fn load(&self) -> Vec<CartItem> {
        let items = self.cart.get_cart();
        let mut ledger = StockLedger::new();

        for item in &items {
            match self
                .inventory
                .check_stock(item.product_id.clone(), item.quantity)
                .await
            {
                Ok(check) => ledger.record(&item.product_id, check),
                Err(source) => {
                    warn!(%source, product = %item.product_id, "stock check failed");

                    ledger.record_failure(&item.product_id);
                }
            }
        }

        let mut view = self.view();

        view.items.clone_from(&items);
        view.ledger = ledger;
        view.settle_stock_notice();

        items
    }

    /// Change the quantity of a line after checking stock for the new quantity.
    ///
    /// The cart is only updated when the backend confirms the quantity is available.
    ///
    /// # Errors
    ///
    /// Returns [`CartPageError::InvalidQuantity`] below one, [`CartPageError::Busy`] while another
    /// change for the line is in flight, [`CartPageError::Unavailable`] on a shortfall and
    /// [`CartPageError::Api`] if the stock check fails.
    pub async fn change_quantity(
        &self,
        product_id: &str,
        quantity: i64,
    ) -> Result<Vec<CartItem>, CartPageError> {
        let requested = u32::try_from(quantity)
            .ok()
            .filter(|requested| *requested >= 1)
            .ok_or(CartPageError::InvalidQuantity(quantity))?;

        let _updating = Updating::begin(&self.view, product_id)?;

        let check = match self
            .inventory
            .check_stock(product_id.to_string(), requested)
            .await
        {
            Ok(check) => check,
            Err(source) => {
                error!(%source, product = %product_id, "failed to update quantity");

                self.view().notices.transient(QUANTITY_UPDATE_FAILED);

                return Err(source.into());
            }
        };

        if let Some(message) = check.shortfall() {
            let mut view = self.view();

            view.ledger.record(product_id, check);
            view.settle_stock_notice();

            return Err(CartPageError::Unavailable {
                product_id: product_id.to_string(),
                message,
            });
        }

        let items = self.cart.update_cart_item_quantity(product_id, quantity);
        let mut view = self.view();

        view.ledger.record(product_id, check);
        view.items.clone_from(&items);
        view.settle_stock_notice();

        debug!(product = %product_id, quantity, "quantity changed");

        Ok(items)
    }

    /// Remove a line and its stock message.
    pub fn remove(&self, product_id: &str) -> Vec<CartItem> {
        let items = self.cart.remove_from_cart(product_id);
        let mut view = self.view();

        view.ledger.forget(product_id);
        view.items.clone_from(&items);
        view.settle_stock_notice();
        view.notices.transient(ITEM_REMOVED);

        items
    }

    /// Apply a coupon code from the coupon box.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponError`] for a blank or unknown code.
    pub fn apply_coupon(&self, code: &str) -> Result<Coupon, CouponError> {
        let mut view = self.view();
        let coupon = view.coupon.apply(code)?.clone();

        view.notices.transient(COUPON_APPLIED);

        Ok(coupon)
    }

    /// Cart totals. The cart page shows no shipping charge.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if a line cannot be priced.
    pub fn totals(&self) -> Result<PriceBreakdown, PricingError> {
        let view = self.view();

        price_cart(&view.items, view.coupon.applied(), None)
    }

    /// Leave for checkout if every line has stock.
    ///
    /// # Errors
    ///
    /// Returns a [`StockError`] for an empty cart or outstanding stock messages.
    pub fn proceed_to_checkout(&self) -> Result<CheckoutSeed, StockError> {
        let mut view = self.view();

        if let Err(error) = checkout_gate(&view.items, &view.ledger) {
            match error {
                StockError::EmptyCart => view.notices.transient(CART_EMPTY),
                StockError::StockConflicts(_) => view.notices.persistent(RESOLVE_STOCK_ISSUES),
            }

            return Err(error);
        }

        view.settle_stock_notice();

        Ok(CheckoutSeed {
            items: view.items.clone(),
            coupon: view.coupon.applied().cloned(),
        })
    }

    /// Lines as last shown.
    pub fn items(&self) -> Vec<CartItem> {
        self.view().items.clone()
    }

    /// Stock message shown next to a line.
    pub fn stock_error(&self, product_id: &str) -> Option<String> {
        self.view()
            .ledger
            .error_for(product_id)
            .map(ToString::to_string)
    }

    /// Whether a quantity change for the line is in flight.
    pub fn is_updating(&self, product_id: &str) -> bool {
        self.view().updating.contains(product_id)
    }

    /// Error from the last coupon attempt.
    pub fn coupon_error(&self) -> Option<CouponError> {
        self.view().coupon.error().cloned()
    }

    /// Notices still showing.
    pub fn notices(&self) -> Notices {
        let mut view = self.view();

        view.notices.prune(Timestamp::now());

        view.notices.clone()
    }

    fn view(&self) -> MutexGuard<'_, View> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Marks a line as updating until dropped.
struct Updating<'a> {
    view: &'a Mutex<View>,
    product_id: String,
}

impl<'a> Updating<'a> {
    fn begin(view: &'a Mutex<View>, product_id: &str) -> Result<Self, CartPageError> {
        let inserted = view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .updating
            .insert(product_id.to_string());

        if !inserted {
            return Err(CartPageError::Busy(product_id.to_string()));
        }

        Ok(Self {
            view,
            product_id: product_id.to_string(),
        })
    }
}

impl Drop for Updating<'_> {
    fn drop(&mut self) {
        self.view
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .updating
            .remove(&self.product_id);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use storefront::{products::Product, stock::StockCheck, storage::MemoryStore};
    use testresult::TestResult;

    use super::*;
    use crate::api::{InventoryRecord, InventoryUpdate, services::MockInventoryService};

    fn product(id: &str, price: i64) -> Product {
        Product {
            id: id.to_string(),
            name: id.to_string(),
            description: String::new(),
            price: Decimal::from(price),
            discount: None,
            image: None,
            images: Vec::new(),
            category_id: None,
            stock_quantity: None,
            available_platforms: Vec::new(),
            is_new: false,
            sku: None,
        }
    }

    fn in_stock(stock_quantity: u32) -> StockCheck {
        StockCheck {
            available: true,
            stock_quantity,
        }
    }

    fn short(stock_quantity: u32) -> StockCheck {
        StockCheck {
            available: false,
            stock_quantity,
        }
    }

    fn cart_with(lines: &[(&str, i64, u32)]) -> Arc<CartStore<MemoryStore>> {
        let cart = Arc::new(CartStore::new(MemoryStore::new()));

        for (id, price, quantity) in lines {
            cart.add_to_cart(&product(id, *price), *quantity);
        }

        cart
    }

    #[tokio::test]
    async fn load_records_shortfalls_and_failures() {
        let cart = cart_with(&[("lamp", 1299, 1), ("caddy", 500, 5), ("throw", 2450, 1)]);
        let mut inventory = MockInventoryService::new();

        inventory
            .expect_check_stock()
            .times(3)
            .returning(|product_id, _| match product_id.as_str() {
                "lamp" => Ok(in_stock(12)),
                "caddy" => Ok(short(2)),
                _ => Err(ApiError::UnexpectedResponse {
                    status: 500,
                    body: String::new(),
                }),
            });

        let page = CartPage::new(cart, inventory);

        assert_eq!(page.load().await.len(), 3);
        assert_eq!(page.stock_error("lamp"), None);
        assert_eq!(page.stock_error("caddy").as_deref(), Some("Only 2 available"));
        assert_eq!(page.stock_error("throw").as_deref(), Some("Stock check failed"));
        assert!(page.proceed_to_checkout().is_err());
        assert!(page.notices().contains(RESOLVE_STOCK_ISSUES));
    }

    #[tokio::test]
    async fn quantity_below_one_is_ignored() {
        let cart = cart_with(&[("lamp", 1299, 1)]);
        let mut inventory = MockInventoryService::new();

        inventory.expect_check_stock().never();

        let page = CartPage::new(cart.clone(), inventory);

        let result = page.change_quantity("lamp", 0).await;

        assert!(matches!(result, Err(CartPageError::InvalidQuantity(0))));
        assert_eq!(cart.item_count(), 1);
    }

    #[tokio::test]
    async fn shortfall_leaves_cart_unchanged() {
        let cart = cart_with(&[("caddy", 500, 1)]);
        let mut inventory = MockInventoryService::new();

        inventory
            .expect_check_stock()
            .withf(|product_id, quantity| product_id == "caddy" && *quantity == 3)
            .times(1)
            .returning(|_, _| Ok(short(2)));

        let page = CartPage::new(cart.clone(), inventory);

        let result = page.change_quantity("caddy", 3).await;

        assert!(matches!(
            result,
            Err(CartPageError::Unavailable { message, .. }) if message == "Only 2 available"
        ));
        assert_eq!(cart.item_count(), 1);
        assert!(!page.is_updating("caddy"));
    }

    #[tokio::test]
    async fn available_quantity_updates_and_clears_message() -> TestResult {
        let cart = cart_with(&[("caddy", 500, 5)]);
        let mut inventory = MockInventoryService::new();

        inventory
            .expect_check_stock()
            .returning(|_, quantity| Ok(if quantity > 2 { short(2) } else { in_stock(2) }));

        let page = CartPage::new(cart.clone(), inventory);

        page.load().await;

        assert!(page.stock_error("caddy").is_some());

        let items = page.change_quantity("caddy", 2).await?;

        assert_eq!(items.first().map(|item| item.quantity), Some(2));
        assert_eq!(page.stock_error("caddy"), None);
        assert_eq!(cart.cart_total(), Decimal::from(1000));

        let seed = page.proceed_to_checkout()?;

        assert_eq!(seed.items, items);

        Ok(())
    }

    #[tokio::test]
    async fn repeated_blocked_checkout_shows_one_notice_until_resolved() -> TestResult {
        let cart = cart_with(&[("caddy", 500, 5)]);
        let mut inventory = MockInventoryService::new();

        inventory
            .expect_check_stock()
            .returning(|_, quantity| Ok(if quantity > 2 { short(2) } else { in_stock(2) }));

        let page = CartPage::new(cart, inventory);

        page.load().await;

        for _ in 0..3 {
            assert!(matches!(
                page.proceed_to_checkout(),
                Err(StockError::StockConflicts(_))
            ));
        }

        let notices = page.notices();

        assert_eq!(notices.len(), 1);
        assert!(notices.contains(RESOLVE_STOCK_ISSUES));

        page.change_quantity("caddy", 2).await?;

        assert_eq!(page.stock_error("caddy"), None);
        assert!(!page.notices().contains(RESOLVE_STOCK_ISSUES));

        Ok(())
    }

    #[tokio::test]
    async fn removing_the_short_line_clears_stock_notice() {
        let cart = cart_with(&[("caddy", 500, 5), ("lamp", 1299, 1)]);
        let mut inventory = MockInventoryService::new();

        inventory
            .expect_check_stock()
            .returning(|product_id, _| {
                Ok(if product_id == "caddy" {
                    short(2)
                } else {
                    in_stock(9)
                })
            });

        let page = CartPage::new(cart, inventory);

        page.load().await;

        assert!(page.proceed_to_checkout().is_err());
        assert!(page.notices().contains(RESOLVE_STOCK_ISSUES));

        page.remove("caddy");

        assert!(!page.notices().contains(RESOLVE_STOCK_ISSUES));
        assert!(page.proceed_to_checkout().is_ok());
    }

    #[tokio::test]
    async fn failed_check_raises_retry_notice() {
        let cart = cart_with(&[("lamp", 1299, 1)]);
        let mut inventory = MockInventoryService::new();

        inventory.expect_check_stock().returning(|_, _| {
            Err(ApiError::UnexpectedResponse {
                status: 503,
                body: String::new(),
            })
        });

        let page = CartPage::new(cart.clone(), inventory);

        assert!(matches!(
            page.change_quantity("lamp", 2).await,
            Err(CartPageError::Api(_))
        ));
        assert!(page.notices().contains(QUANTITY_UPDATE_FAILED));
        assert_eq!(cart.item_count(), 1);
    }

    struct SlowInventory {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl InventoryService for SlowInventory {
        async fn check_stock(
            &self,
            _product_id: String,
            quantity: u32,
        ) -> Result<StockCheck, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            tokio::task::yield_now().await;

            Ok(in_stock(quantity))
        }

        async fn get_inventory(&self, _product_id: String) -> Result<InventoryRecord, ApiError> {
            Ok(InventoryRecord {
                stock: 0,
                restock_threshold: None,
            })
        }

        async fn update_inventory(
            &self,
            _product_id: String,
            _update: InventoryUpdate,
        ) -> Result<InventoryRecord, ApiError> {
            self.get_inventory(String::new()).await
        }
    }

    #[tokio::test]
    async fn second_change_while_in_flight_is_rejected() {
        let cart = cart_with(&[("lamp", 1299, 1)]);
        let page = CartPage::new(
            cart.clone(),
            SlowInventory {
                calls: AtomicUsize::new(0),
            },
        );

        let (first, second) = tokio::join!(
            page.change_quantity("lamp", 2),
            page.change_quantity("lamp", 3)
        );

        assert!(first.is_ok());
        assert!(matches!(second, Err(CartPageError::Busy(id)) if id == "lamp"));
        assert_eq!(page.inventory.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cart.item_count(), 2);
        assert!(!page.is_updating("lamp"));
    }

    #[tokio::test]
    async fn remove_forgets_stock_message_and_notifies() {
        let cart = cart_with(&[("caddy", 500, 5)]);
        let mut inventory = MockInventoryService::new();

        inventory.expect_check_stock().returning(|_, _| Ok(short(2)));

        let page = CartPage::new(cart, inventory);

        page.load().await;

        assert!(page.remove("caddy").is_empty());
        assert_eq!(page.stock_error("caddy"), None);
        assert!(page.notices().contains(ITEM_REMOVED));
        assert_eq!(page.proceed_to_checkout(), Err(StockError::EmptyCart));
        assert!(page.notices().contains(CART_EMPTY));
    }

    #[tokio::test]
    async fn coupon_discount_flows_into_totals_and_seed() -> TestResult {
        let cart = cart_with(&[("throw", 2450, 1)]);
        let mut inventory = MockInventoryService::new();

        inventory.expect_check_stock().returning(|_, _| Ok(in_stock(9)));

        let page = CartPage::new(cart, inventory);

        page.load().await;

        assert_eq!(page.apply_coupon(""), Err(CouponError::Empty));
        assert_eq!(page.coupon_error(), Some(CouponError::Empty));

        page.apply_coupon("save10")?;

        let totals = page.totals()?;

        assert_eq!(totals.discount().to_minor_units(), 245_00);
        assert_eq!(totals.shipping_fee().to_minor_units(), 0);
        assert_eq!(totals.total().to_minor_units(), 2205_00);
        assert!(page.notices().contains(COUPON_APPLIED));

        let seed = page.proceed_to_checkout()?;

        assert_eq!(seed.coupon.map(|coupon| coupon.code), Some("SAVE10".to_string()));

        Ok(())
    }
}
