//! Order review table

use std::io;

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Style,
        object::{Columns, Rows},
    },
};

use crate::{
    cart::CartItem,
    pricing::{PriceBreakdown, PricingError, format_price, money},
};

use super::CheckoutError;

fn line_row(item: &CartItem) -> Result<[String; 4], PricingError> {
    Ok([
        item.name.clone(),
        item.quantity.to_string(),
        format_price(&money(item.unit_price())?),
        format_price(&money(item.line_subtotal())?),
    ])
}

fn total_row(label: &str, value: &Money<'_, Currency>) -> [String; 4] {
    [
        label.to_string(),
        String::new(),
        String::new(),
        format_price(value),
    ]
}

/// Render the review-step summary: one row per line, then the totals.
///
/// # Errors
///
/// Returns [`CheckoutError::Pricing`] if a line amount cannot be represented, or
/// [`CheckoutError::Io`] if writing fails.
pub fn write_summary(
    mut out: impl io::Write,
    items: &[CartItem],
    totals: &PriceBreakdown,
) -> Result<(), CheckoutError> {
    let mut builder = Builder::default();

    builder.push_record(["Item", "Qty", "Price", "Subtotal"]);

    for item in items {
        builder.push_record(line_row(item)?);
    }

    builder.push_record(total_row("Subtotal", &totals.subtotal()));

    if totals.discount().to_minor_units() > 0 {
        builder.push_record(total_row("Discount", &totals.discount()));
    }

    builder.push_record(total_row("Shipping", &totals.shipping_fee()));
    builder.push_record(total_row("Total", &totals.total()));

    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Alignment::center());
    table.modify(Columns::new(1..4), Alignment::right());

    writeln!(out, "{table}").map_err(|_err| CheckoutError::Io)
}
