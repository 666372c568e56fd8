//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CART_KEY, CartItem, CartStore, SubscriptionKey},
    checkout::{
        Checkout, CheckoutError, CheckoutStep,
        form::{CheckoutForm, Field, PaymentMethod},
        order::{OrderConfirmation, OrderLine, OrderPayload, ShippingAddress},
    },
    coupons::{Coupon, CouponError, CouponKind, CouponState, find_coupon},
    discounts::DiscountError,
    fixtures::{Fixture, FixtureError},
    pricing::{CURRENCY, PriceBreakdown, PricingError, format_price, price_cart},
    products::{Category, Product},
    shipping::{ShippingMethod, ShippingTier},
    stock::{StockCheck, StockError, StockLedger, checkout_gate},
    storage::{FileStore, KeyValueStore, MemoryStore, StorageError},
    users::User,
};
