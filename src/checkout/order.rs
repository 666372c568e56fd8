//! Order payload and confirmation

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    cart::CartItem,
    coupons::Coupon,
    pricing::{PriceBreakdown, amount},
    shipping::ShippingMethod,
};

use super::form::{CheckoutForm, PaymentMethod};

/// One ordered line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Ordered product
    pub product_id: String,

    /// Product name
    pub name: String,

    /// List price
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Discounted price, if any
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub discounted_price: Option<Decimal>,

    /// Units ordered
    pub quantity: u32,

    /// Product image
    #[serde(default)]
    pub image: Option<String>,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            price: item.price,
            discounted_price: item.discounted_price,
            quantity: item.quantity,
            image: item.image.clone(),
        }
    }
}

/// Delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Recipient name
    pub full_name: String,

    /// First address line
    pub line1: String,

    /// Second address line, empty when unused
    pub line2: String,

    /// City
    pub city: String,

    /// State
    pub state: String,

    /// Postal code
    pub postal_code: String,

    /// Country
    pub country: String,

    /// Contact phone
    pub phone: String,

    /// Contact email
    pub email: String,
}

impl From<&CheckoutForm> for ShippingAddress {
    fn from(form: &CheckoutForm) -> Self {
        Self {
            full_name: form.full_name.trim().to_string(),
            line1: form.line1.trim().to_string(),
            line2: form.line2.trim().to_string(),
            city: form.city.trim().to_string(),
            state: form.state.trim().to_string(),
            postal_code: form.postal_code.trim().to_string(),
            country: form.country.trim().to_string(),
            phone: form.phone.trim().to_string(),
            email: form.email.trim().to_string(),
        }
    }
}

/// Body of the order-creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    /// Ordered lines
    pub items: Vec<OrderLine>,

    /// Delivery address
    pub shipping_address: ShippingAddress,

    /// Shipping tier
    pub shipping_method: ShippingMethod,

    /// Payment method
    pub payment_method: PaymentMethod,

    /// Items subtotal before coupon and shipping
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,

    /// Coupon discount
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_amount: Decimal,

    /// Shipping fee charged
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping_amount: Decimal,

    /// Amount payable
    #[serde(with = "rust_decimal::serde::float")]
    pub final_amount: Decimal,

    /// Order notes, empty when none
    pub notes: String,

    /// Applied coupon
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
}

impl OrderPayload {
    /// Assemble the payload from a cart snapshot, the completed form and its computed totals.
    #[must_use]
    pub fn assemble(
        items: &[CartItem],
        form: &CheckoutForm,
        coupon: Option<&Coupon>,
        totals: &PriceBreakdown,
    ) -> Self {
        Self {
            items: items.iter().map(OrderLine::from).collect(),
            shipping_address: ShippingAddress::from(form),
            shipping_method: form.shipping_method,
            payment_method: form.payment_method,
            total_amount: amount(&totals.subtotal()),
            discount_amount: amount(&totals.discount()),
            shipping_amount: amount(&totals.shipping_fee()),
            final_amount: amount(&totals.total()),
            notes: form.notes.trim().to_string(),
            coupon_code: coupon.map(|coupon| coupon.code.clone()),
        }
    }
}

/// What the backend returns for a created order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    /// Human-facing order number
    pub order_number: String,

    /// Amount charged
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub final_amount: Option<Decimal>,

    /// Payment method recorded on the order
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,

    /// Any other fields the backend sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
