use std::io;

use clap::Args;
use storefront::{
    checkout::{
        CheckoutError,
        form::{Field, PaymentMethod},
    },
    pricing::format_price,
    shipping::ShippingMethod,
};
use storefront_app::{
    cart_page::CartPage,
    checkout_flow::{CheckoutFlow, CheckoutFlowError},
    context::AppContext,
};

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Coupon code carried from the cart
    #[arg(long)]
    coupon: Option<String>,

    /// Recipient name; defaults to the signed-in user
    #[arg(long)]
    full_name: Option<String>,

    /// Contact email; defaults to the signed-in user
    #[arg(long)]
    email: Option<String>,

    /// Ten-digit mobile number
    #[arg(long)]
    phone: Option<String>,

    /// First address line
    #[arg(long)]
    line1: Option<String>,

    /// Second address line
    #[arg(long)]
    line2: Option<String>,

    /// City
    #[arg(long)]
    city: Option<String>,

    /// State
    #[arg(long)]
    state: Option<String>,

    /// Postal code
    #[arg(long)]
    postal_code: Option<String>,

    /// Country
    #[arg(long)]
    country: Option<String>,

    /// Shipping method (standard, express, overnight)
    #[arg(long, default_value = "standard")]
    shipping: ShippingMethod,

    /// Payment method (cod, card, upi)
    #[arg(long, default_value = "cod")]
    payment: PaymentMethod,

    /// Card number
    #[arg(long)]
    card_number: Option<String>,

    /// Name on card
    #[arg(long)]
    card_name: Option<String>,

    /// Card expiry (MM/YY)
    #[arg(long)]
    expiry_date: Option<String>,

    /// Card security code
    #[arg(long)]
    cvv: Option<String>,

    /// UPI id
    #[arg(long)]
    upi_id: Option<String>,

    /// Order notes
    #[arg(long)]
    notes: Option<String>,
}

impl CheckoutArgs {
    fn fields(self) -> [(Field, Option<String>); 15] {
        [
            (Field::FullName, self.full_name),
            (Field::Email, self.email),
            (Field::Phone, self.phone),
            (Field::Line1, self.line1),
            (Field::Line2, self.line2),
            (Field::City, self.city),
            (Field::State, self.state),
            (Field::PostalCode, self.postal_code),
            (Field::Country, self.country),
            (Field::CardNumber, self.card_number),
            (Field::CardName, self.card_name),
            (Field::ExpiryDate, self.expiry_date),
            (Field::Cvv, self.cvv),
            (Field::UpiId, self.upi_id),
            (Field::Notes, self.notes),
        ]
    }
}

pub(crate) async fn run(args: CheckoutArgs, context: &AppContext) -> Result<(), String> {
    let page = CartPage::new(context.cart.clone(), context.backend.clone());

    page.load().await;

    if let Some(code) = &args.coupon {
        page.apply_coupon(code)
            .map_err(|error| format!("coupon {code}: {error}"))?;
    }

    let seed = page.proceed_to_checkout().map_err(|error| error.to_string())?;
    let user = context.session.current_user();

    let flow = CheckoutFlow::new(
        seed,
        user.as_ref(),
        context.cart.clone(),
        context.backend.clone(),
    );

    {
        let mut checkout = flow.checkout();

        checkout
            .set_shipping_method(args.shipping)
            .map_err(|error| error.to_string())?;
        checkout
            .set_payment_method(args.payment)
            .map_err(|error| error.to_string())?;

        for (field, value) in args.fields() {
            if let Some(value) = value {
                checkout
                    .set_field(field, value)
                    .map_err(|error| format!("{field}: {error}"))?;
            }
        }

        while checkout.step().number() < 4 {
            if let Err(error) = checkout.next() {
                for (field, message) in checkout.errors() {
                    println!("{field}: {message}");
                }

                return Err(error.to_string());
            }
        }

        checkout
            .write_summary(io::stdout())
            .map_err(|error| error.to_string())?;
    }

    match flow.place_order().await {
        Ok(confirmation) => {
            println!("order placed: {}", confirmation.order_number);

            if let Ok(total) = flow.checkout().totals() {
                println!("charged: {}", format_price(&total.total()));
            }

            Ok(())
        }
        Err(CheckoutFlowError::Checkout(CheckoutError::Validation { step, fields })) => {
            Err(format!("{step} needs attention: {fields:?}"))
        }
        Err(error) => Err(format!("failed to place order: {error}")),
    }
}
