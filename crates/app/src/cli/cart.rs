use clap::{Args, Subcommand};
use storefront::{
    cart::CartItem,
    pricing::{PriceBreakdown, format_price, money},
    storage::KeyValueStore,
};
use storefront_app::{
    api::{CatalogService, InventoryService},
    cart_page::CartPage,
    context::AppContext,
};

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart with stock messages and totals
    Show(ShowCartArgs),

    /// Add a product
    Add(AddArgs),

    /// Remove a product
    Remove(ProductArgs),

    /// Change the quantity of a line
    Quantity(QuantityArgs),

    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
struct ShowCartArgs {
    /// Coupon code to try
    #[arg(long)]
    coupon: Option<String>,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Product id
    product_id: String,

    /// Units to add
    #[arg(long, default_value_t = 1)]
    quantity: u32,
}

#[derive(Debug, Args)]
struct ProductArgs {
    /// Product id
    product_id: String,
}

#[derive(Debug, Args)]
struct QuantityArgs {
    /// Product id
    product_id: String,

    /// New quantity, at least 1
    quantity: i64,
}

pub(crate) async fn run(command: CartCommand, context: &AppContext) -> Result<(), String> {
    let page = CartPage::new(context.cart.clone(), context.backend.clone());

    match command.command {
        CartSubcommand::Show(args) => {
            page.load().await;

            if let Some(code) = args.coupon {
                if let Err(error) = page.apply_coupon(&code) {
                    println!("coupon: {error}");
                }
            }

            let totals = page
                .totals()
                .map_err(|error| format!("failed to price cart: {error}"))?;

            print_cart(&page, &page.items(), &totals)
        }
        CartSubcommand::Add(args) => {
            let product = context
                .backend
                .get_product(args.product_id)
                .await
                .map_err(|error| format!("failed to fetch product: {error}"))?;

            let items = context.cart.add_to_cart(&product, args.quantity);

            println!("{} in cart ({} lines)", product.name, items.len());

            Ok(())
        }
        CartSubcommand::Remove(args) => {
            let items = page.remove(&args.product_id);

            println!("{} lines left", items.len());

            Ok(())
        }
        CartSubcommand::Quantity(args) => {
            page.load().await;

            page.change_quantity(&args.product_id, args.quantity)
                .await
                .map_err(|error| format!("failed to update quantity: {error}"))?;

            println!("{} now at {}", args.product_id, args.quantity);

            Ok(())
        }
        CartSubcommand::Clear => {
            context.cart.clear_cart();

            println!("cart cleared");

            Ok(())
        }
    }
}

fn print_cart<S: KeyValueStore, I: InventoryService>(
    page: &CartPage<S, I>,
    items: &[CartItem],
    totals: &PriceBreakdown,
) -> Result<(), String> {
    if items.is_empty() {
        println!("your cart is empty");
        return Ok(());
    }

    for item in items {
        let subtotal = money(item.line_subtotal())
            .map_err(|error| format!("failed to price {}: {error}", item.product_id))?;

        println!(
            "{}\t{} x{}\t{}",
            item.product_id,
            item.name,
            item.quantity,
            format_price(&subtotal)
        );

        if let Some(message) = page.stock_error(&item.product_id) {
            println!("\t{message}");
        }
    }

    println!("subtotal: {}", format_price(&totals.subtotal()));

    if totals.discount().to_minor_units() > 0 {
        println!("discount: -{}", format_price(&totals.discount()));
    }

    println!("total: {}", format_price(&totals.total()));

    Ok(())
}
