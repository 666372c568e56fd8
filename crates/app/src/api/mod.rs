//! Backend API
//!
//! The REST backend is an external collaborator: this module only knows its request and response
//! shapes.

pub mod client;
pub mod errors;
pub mod filters;
pub mod services;
pub mod session;

pub use client::BackendClient;
pub use errors::ApiError;
pub use filters::{Page, Pagination, ProductFilter, SortBy};
pub use services::{
    CatalogService, InventoryRecord, InventoryService, InventoryUpdate, OrdersService,
};
pub use session::Session;
