//! Storefront
//!
//! Storefront is the client-side core of an e-commerce storefront: a persisted shopping cart,
//! coupon and shipping pricing, stock reconciliation and a validated multi-step checkout.

pub mod cart;
pub mod checkout;
pub mod coupons;
pub mod discounts;
pub mod fixtures;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod shipping;
pub mod stock;
pub mod storage;
pub mod users;
