//! Checkout page controller.
//!
//! Wraps the checkout state machine with the two collaborators it needs to finish: the cart,
//! which is cleared once an order is confirmed, and the orders backend.

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use storefront::{
    cart::CartStore,
    checkout::{Checkout, CheckoutError, order::OrderConfirmation},
    storage::KeyValueStore,
    users::User,
};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{
    api::{ApiError, OrdersService},
    cart_page::CheckoutSeed,
    notices::ORDER_FAILED,
};

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum CheckoutFlowError {
    /// The checkout refused to submit.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The backend rejected the order or could not be reached.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Checkout page state and actions.
#[derive(Debug)]
pub struct CheckoutFlow<S, O> {
    checkout: Mutex<Checkout>,
    cart: Arc<CartStore<S>>,
    orders: O,
    mounted: AtomicBool,
}

impl<S: KeyValueStore, O: OrdersService> CheckoutFlow<S, O> {
    /// Start checkout from what the cart page handed over.
    pub fn new(seed: CheckoutSeed, user: Option<&User>, cart: Arc<CartStore<S>>, orders: O) -> Self {
        Self {
            checkout: Mutex::new(Checkout::new(seed.items, seed.coupon).with_user(user)),
            cart,
            orders,
            mounted: AtomicBool::new(true),
        }
    }

    /// The checkout state machine. Do not hold the guard across an await.
    pub fn checkout(&self) -> MutexGuard<'_, Checkout> {
        self.checkout.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Place the order.
    ///
    /// Only one submission is in flight at a time; a call made while one is pending fails with
    /// [`CheckoutError::AlreadySubmitting`] without contacting the backend. On success the cart is
    /// cleared and checkout moves to the success step. On failure the cart and the step are left
    /// alone and a retryable error is recorded.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutFlowError::Checkout`] if the checkout cannot submit and
    /// [`CheckoutFlowError::Api`] if the backend call fails.
    pub async fn place_order(&self) -> Result<OrderConfirmation, CheckoutFlowError> {
        let payload = self.checkout().begin_submission()?;

        match self.orders.create_order(payload).await {
            Ok(confirmation) => {
                info!(order_number = %confirmation.order_number, "order placed");

                self.cart.clear_cart();

                if self.is_mounted() {
                    self.checkout().complete(confirmation.clone())?;
                } else {
                    debug!("checkout view gone, confirmation not applied");

                    self.checkout().abandon();
                }

                Ok(confirmation)
            }
            Err(source) => {
                error!(%source, "failed to place order");

                if self.is_mounted() {
                    self.checkout().fail(ORDER_FAILED);
                } else {
                    self.checkout().abandon();
                }

                Err(source.into())
            }
        }
    }

    /// Mark the view as gone. A response that arrives afterwards is not applied to checkout state
    /// beyond ending the submission.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    /// Whether the view is still showing.
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }
}
