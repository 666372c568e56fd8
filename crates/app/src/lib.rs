//! Storefront client application: backend services, page controllers and process setup.

pub mod api;
pub mod cart_page;
pub mod checkout_flow;
pub mod config;
pub mod context;
pub mod notices;
pub mod observability;
