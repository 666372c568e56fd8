//! Backend services.

use async_trait::async_trait;
use mockall::automock;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use storefront::{
    checkout::order::{OrderConfirmation, OrderPayload},
    products::{Category, Product},
    stock::StockCheck,
    storage::KeyValueStore,
};

use crate::api::{
    client::BackendClient,
    errors::ApiError,
    filters::{Listing, Page, ProductFilter},
};

/// Stock on hand for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    /// Units on hand
    pub stock: u32,

    /// Level at which the product should be restocked
    #[serde(default)]
    pub restock_threshold: Option<u32>,
}

/// Inventory change. Absent fields are left as they are.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdate {
    /// New units on hand
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,

    /// New restock level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restock_threshold: Option<u32>,
}

/// Product catalogue.
#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// One page of products matching `filter`.
    async fn list_products(&self, filter: ProductFilter) -> Result<Page<Product>, ApiError>;

    /// A single product.
    async fn get_product(&self, id: String) -> Result<Product, ApiError>;

    /// All categories.
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError>;
}

/// Stock levels.
#[automock]
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Whether `quantity` units of a product can be ordered.
    async fn check_stock(&self, product_id: String, quantity: u32)
    -> Result<StockCheck, ApiError>;

    /// Stock on hand for a product.
    async fn get_inventory(&self, product_id: String) -> Result<InventoryRecord, ApiError>;

    /// Change the stock record for a product.
    async fn update_inventory(
        &self,
        product_id: String,
        update: InventoryUpdate,
    ) -> Result<InventoryRecord, ApiError>;
}

/// Order placement.
#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Create an order from an assembled payload.
    async fn create_order(&self, payload: OrderPayload) -> Result<OrderConfirmation, ApiError>;
}

#[async_trait]
impl<S: KeyValueStore> CatalogService for BackendClient<S> {
    async fn list_products(&self, filter: ProductFilter) -> Result<Page<Product>, ApiError> {
        let request = self
            .request(Method::GET, "products")
            .query(filter.query_pairs().as_slice());

        let listing: Listing<Product> = self.send(request).await?;

        Ok(listing.into_page(&filter))
    }

    async fn get_product(&self, id: String) -> Result<Product, ApiError> {
        self.send(self.request(Method::GET, &format!("products/{id}")))
            .await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.send(self.request(Method::GET, "categories")).await
    }
}

#[async_trait]
impl<S: KeyValueStore> InventoryService for BackendClient<S> {
    async fn check_stock(
        &self,
        product_id: String,
        quantity: u32,
    ) -> Result<StockCheck, ApiError> {
        let request = self
            .request(Method::GET, &format!("inventory/{product_id}/check"))
            .query(&[("quantity", quantity)]);

        self.send(request).await
    }

    async fn get_inventory(&self, product_id: String) -> Result<InventoryRecord, ApiError> {
        self.send(self.request(Method::GET, &format!("inventory/{product_id}")))
            .await
    }

    async fn update_inventory(
        &self,
        product_id: String,
        update: InventoryUpdate,
    ) -> Result<InventoryRecord, ApiError> {
        let request = self
            .request(Method::PUT, &format!("inventory/{product_id}"))
            .json(&update);

        self.send(request).await
    }
}

#[async_trait]
impl<S: KeyValueStore> OrdersService for BackendClient<S> {
    async fn create_order(&self, payload: OrderPayload) -> Result<OrderConfirmation, ApiError> {
        self.send(self.request(Method::POST, "orders").json(&payload))
            .await
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn inventory_update_omits_unset_fields() -> TestResult {
        let update = InventoryUpdate {
            stock: Some(8),
            ..InventoryUpdate::default()
        };

        assert_eq!(serde_json::to_string(&update)?, r#"{"stock":8}"#);

        Ok(())
    }

    #[test]
    fn inventory_record_reads_camel_case() -> TestResult {
        let record: InventoryRecord =
            serde_json::from_str(r#"{"stock":3,"restockThreshold":5}"#)?;

        assert_eq!(
            record,
            InventoryRecord {
                stock: 3,
                restock_threshold: Some(5),
            }
        );

        Ok(())
    }

    #[tokio::test]
    async fn mocked_catalog_returns_categories() -> TestResult {
        let mut catalog = MockCatalogService::new();

        catalog.expect_list_categories().times(1).returning(|| {
            Ok(vec![Category {
                id: "lighting".to_string(),
                name: "Lighting".to_string(),
                description: None,
            }])
        });

        let categories = catalog.list_categories().await?;

        assert_eq!(categories.len(), 1);

        Ok(())
    }
}
