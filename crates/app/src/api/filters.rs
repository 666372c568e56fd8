//! Product listing filters and paging.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Listing order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum SortBy {
    /// Newest first
    #[default]
    Newest,

    /// Price, low to high
    PriceAsc,

    /// Price, high to low
    PriceDesc,

    /// Top rated
    Rating,

    /// Most popular
    Popular,

    /// Name, A-Z
    NameAsc,

    /// Name, Z-A
    NameDesc,
}

impl SortBy {
    /// Query value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SortBy::Newest => "newest",
            SortBy::PriceAsc => "price_asc",
            SortBy::PriceDesc => "price_desc",
            SortBy::Rating => "rating",
            SortBy::Popular => "popular",
            SortBy::NameAsc => "name_asc",
            SortBy::NameDesc => "name_desc",
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Product listing query. Blank text filters and empty platform lists are left out of the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFilter {
    /// Free-text search
    pub search: Option<String>,

    /// Category id
    pub category: Option<String>,

    /// Lower price bound in rupees
    pub min_price: Option<f64>,

    /// Upper price bound in rupees
    pub max_price: Option<f64>,

    /// Only products with stock on hand
    pub in_stock: bool,

    /// Only products on local sale
    pub local_sale: bool,

    /// Marketplaces the product must be listed on
    pub platforms: Vec<String>,

    /// Listing order
    pub sort_by: SortBy,

    /// One-based page number
    pub page: u32,

    /// Page size
    pub limit: u32,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            search: None,
            category: None,
            min_price: None,
            max_price: None,
            in_stock: false,
            local_sale: false,
            platforms: Vec::new(),
            sort_by: SortBy::default(),
            page: 1,
            limit: 12,
        }
    }
}

impl ProductFilter {
    /// Query string pairs in request order. Platforms repeat the `platforms` key.
    #[must_use]
    pub fn query_pairs(&self) -> SmallVec<[(&'static str, String); 10]> {
        let mut pairs: SmallVec<[(&'static str, String); 10]> = SmallVec::new();

        let text = [("search", &self.search), ("category", &self.category)];

        for (key, value) in text {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                pairs.push((key, value.to_string()));
            }
        }

        let bounds = [("minPrice", self.min_price), ("maxPrice", self.max_price)];

        for (key, value) in bounds {
            if let Some(value) = value.filter(|v| v.is_finite()) {
                pairs.push((key, value.to_string()));
            }
        }

        pairs.push(("inStock", self.in_stock.to_string()));
        pairs.push(("localSale", self.local_sale.to_string()));

        for platform in &self.platforms {
            pairs.push(("platforms", platform.clone()));
        }

        pairs.push(("sortBy", self.sort_by.to_string()));
        pairs.push(("page", self.page.max(1).to_string()));
        pairs.push(("limit", self.limit.to_string()));

        pairs
    }
}

/// Paging metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page
    pub page: u32,

    /// Page size
    pub limit: u32,

    /// Total matching records
    pub total: u64,

    /// Total pages
    pub total_pages: u32,

    /// Whether a following page exists
    #[serde(default)]
    pub has_next: bool,

    /// Whether a preceding page exists
    #[serde(default)]
    pub has_prev: bool,
}

impl Pagination {
    /// Metadata for a response that returned everything at once.
    #[must_use]
    pub fn single(filter: &ProductFilter, total: usize) -> Self {
        Self {
            page: filter.page.max(1),
            limit: filter.limit,
            total: u64::try_from(total).unwrap_or(u64::MAX),
            total_pages: 1,
            has_next: false,
            has_prev: false,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Records on this page
    pub data: Vec<T>,

    /// Paging metadata
    pub pagination: Pagination,
}

/// Listing response: either a page envelope or a bare array from older backends.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Paged(Page<T>),
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    pub(crate) fn into_page(self, filter: &ProductFilter) -> Page<T> {
        match self {
            Listing::Paged(page) => page,
            Listing::Bare(data) => Page {
                pagination: Pagination::single(filter, data.len()),
                data,
            },
        }
    }
}
