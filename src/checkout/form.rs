//! Checkout form state

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{shipping::ShippingMethod, users::User};

/// Country preselected on the address step.
pub const DEFAULT_COUNTRY: &str = "India";

/// How the shopper pays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Cash on delivery
    #[default]
    Cod,

    /// Credit or debit card
    Card,

    /// UPI transfer
    Upi,
}

impl PaymentMethod {
    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::Cod => "Cash on Delivery",
            PaymentMethod::Card => "Credit/Debit Card",
            PaymentMethod::Upi => "UPI",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown payment method name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cod" => Ok(PaymentMethod::Cod),
            "card" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            _ => Err(UnknownPaymentMethod(s.to_string())),
        }
    }
}

/// Free-text form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Recipient name
    FullName,

    /// Contact email
    Email,

    /// Mobile number
    Phone,

    /// First address line
    Line1,

    /// Second address line
    Line2,

    /// City
    City,

    /// State
    State,

    /// Postal code
    PostalCode,

    /// Country
    Country,

    /// Card number
    CardNumber,

    /// Name on card
    CardName,

    /// Card expiry
    ExpiryDate,

    /// Card security code
    Cvv,

    /// UPI id
    UpiId,

    /// Order notes
    Notes,
}

impl Field {
    /// Form name of the field.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Field::FullName => "fullName",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Line1 => "line1",
            Field::Line2 => "line2",
            Field::City => "city",
            Field::State => "state",
            Field::PostalCode => "postalCode",
            Field::Country => "country",
            Field::CardNumber => "cardNumber",
            Field::CardName => "cardName",
            Field::ExpiryDate => "expiryDate",
            Field::Cvv => "cvv",
            Field::UpiId => "upiId",
            Field::Notes => "notes",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the shopper enters during checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutForm {
    /// Recipient name
    pub full_name: String,

    /// Contact email
    pub email: String,

    /// Ten-digit mobile number
    pub phone: String,

    /// First address line
    pub line1: String,

    /// Second address line, optional
    pub line2: String,

    /// City
    pub city: String,

    /// State
    pub state: String,

    /// Postal code
    pub postal_code: String,

    /// Country
    pub country: String,

    /// Selected shipping tier
    pub shipping_method: ShippingMethod,

    /// Selected payment method
    pub payment_method: PaymentMethod,

    /// Card number, spaces allowed
    pub card_number: String,

    /// Name on card
    pub card_name: String,

    /// Card expiry
    pub expiry_date: String,

    /// Card security code
    pub cvv: String,

    /// UPI id
    pub upi_id: String,

    /// Free-text order notes
    pub notes: String,
}

impl Default for CheckoutForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            phone: String::new(),
            line1: String::new(),
            line2: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
            shipping_method: ShippingMethod::default(),
            payment_method: PaymentMethod::default(),
            card_number: String::new(),
            card_name: String::new(),
            expiry_date: String::new(),
            cvv: String::new(),
            upi_id: String::new(),
            notes: String::new(),
        }
    }
}

impl CheckoutForm {
    /// Fill name and email from the signed-in user.
    pub fn prefill(&mut self, user: &User) {
        if let Some(name) = &user.name {
            self.full_name.clone_from(name);
        }

        if let Some(email) = &user.email {
            self.email.clone_from(email);
        }
    }

    /// Current value of a field.
    #[must_use]
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::FullName => &self.full_name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Line1 => &self.line1,
            Field::Line2 => &self.line2,
            Field::City => &self.city,
            Field::State => &self.state,
            Field::PostalCode => &self.postal_code,
            Field::Country => &self.country,
            Field::CardNumber => &self.card_number,
            Field::CardName => &self.card_name,
            Field::ExpiryDate => &self.expiry_date,
            Field::Cvv => &self.cvv,
            Field::UpiId => &self.upi_id,
            Field::Notes => &self.notes,
        }
    }

    pub(super) fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::FullName => &mut self.full_name,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::Line1 => &mut self.line1,
            Field::Line2 => &mut self.line2,
            Field::City => &mut self.city,
            Field::State => &mut self.state,
            Field::PostalCode => &mut self.postal_code,
            Field::Country => &mut self.country,
            Field::CardNumber => &mut self.card_number,
            Field::CardName => &mut self.card_name,
            Field::ExpiryDate => &mut self.expiry_date,
            Field::Cvv => &mut self.cvv,
            Field::UpiId => &mut self.upi_id,
            Field::Notes => &mut self.notes,
        }
    }
}
