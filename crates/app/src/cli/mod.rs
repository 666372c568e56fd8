use clap::{Parser, Subcommand};
use storefront_app::{config::AppConfig, context::AppContext};

mod cart;
mod checkout;
mod products;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront client", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Browse the catalogue
    Products(products::ListProductsArgs),

    /// Show or change the cart
    Cart(cart::CartCommand),

    /// Place an order for the current cart
    Checkout(checkout::CheckoutArgs),
}

impl Cli {
    /// Parse arguments after loading `.env`.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        let context = AppContext::from_config(&self.config)
            .map_err(|error| format!("failed to start: {error}"))?;

        match self.command {
            Commands::Products(args) => products::run(args, &context).await,
            Commands::Cart(command) => cart::run(command, &context).await,
            Commands::Checkout(args) => checkout::run(args, &context).await,
        }
    }
}
