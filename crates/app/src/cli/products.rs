use clap::Args;
use storefront::pricing::{format_price, money};
use storefront_app::{
    api::{CatalogService, ProductFilter, SortBy},
    context::AppContext,
};

#[derive(Debug, Args)]
pub(crate) struct ListProductsArgs {
    /// Free-text search
    #[arg(long)]
    search: Option<String>,

    /// Category id
    #[arg(long)]
    category: Option<String>,

    /// Lower price bound in rupees
    #[arg(long)]
    min_price: Option<f64>,

    /// Upper price bound in rupees
    #[arg(long)]
    max_price: Option<f64>,

    /// Only products with stock on hand
    #[arg(long)]
    in_stock: bool,

    /// Marketplace the product must be listed on; repeatable
    #[arg(long = "platform")]
    platforms: Vec<String>,

    /// Listing order
    #[arg(long, value_enum, default_value_t = SortBy::Newest)]
    sort: SortBy,

    /// Page number
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Page size
    #[arg(long, default_value_t = 12)]
    limit: u32,

    /// List categories instead of products
    #[arg(long)]
    categories: bool,
}

impl From<ListProductsArgs> for ProductFilter {
    fn from(args: ListProductsArgs) -> Self {
        Self {
            search: args.search,
            category: args.category,
            min_price: args.min_price,
            max_price: args.max_price,
            in_stock: args.in_stock,
            platforms: args.platforms,
            sort_by: args.sort,
            page: args.page,
            limit: args.limit,
            ..ProductFilter::default()
        }
    }
}

pub(crate) async fn run(args: ListProductsArgs, context: &AppContext) -> Result<(), String> {
    if args.categories {
        let categories = context
            .backend
            .list_categories()
            .await
            .map_err(|error| format!("failed to list categories: {error}"))?;

        for category in categories {
            println!("{}\t{}", category.id, category.name);
        }

        return Ok(());
    }

    let page = context
        .backend
        .list_products(args.into())
        .await
        .map_err(|error| format!("failed to list products: {error}"))?;

    if page.data.is_empty() {
        println!("no products found");
        return Ok(());
    }

    for product in &page.data {
        let price = money(product.discounted_price())
            .map_err(|error| format!("failed to price {}: {error}", product.id))?;

        println!("{}\t{}\t{}", product.id, product.name, format_price(&price));
    }

    println!(
        "page {} of {} ({} products)",
        page.pagination.page, page.pagination.total_pages, page.pagination.total
    );

    Ok(())
}
