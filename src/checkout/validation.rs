//! Step validation
//!
//! Each pre-review step owns a disjoint table of rules. Rules for a field run in order and the
//! first failure wins, so "required" always takes precedence over "invalid".

use std::sync::LazyLock;

use regex::Regex;
use smallvec::SmallVec;

use super::{
    CheckoutStep,
    form::{CheckoutForm, Field, PaymentMethod},
};

static EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").ok());

static PHONE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[6-9][0-9]{9}$").ok());

static CARD_NUMBER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[0-9]{16}$").ok());

static CVV: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").ok());

/// What a rule checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Non-blank after trimming.
    Required,

    /// Looks like `local@domain.tld`.
    Email,

    /// Ten ASCII digits, the first one 6-9.
    Phone,

    /// Sixteen ASCII digits once whitespace is removed.
    CardNumber,

    /// Three or four ASCII digits.
    Cvv,
}

impl Check {
    fn passes(self, value: &str) -> bool {
        match self {
            Check::Required => !value.trim().is_empty(),
            Check::Email => matches(&EMAIL, value),
            Check::Phone => matches(&PHONE, value),
            Check::CardNumber => {
                let digits: String = value.chars().filter(|c| !c.is_whitespace()).collect();

                matches(&CARD_NUMBER, &digits)
            }
            Check::Cvv => matches(&CVV, value),
        }
    }
}

fn matches(pattern: &LazyLock<Option<Regex>>, value: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(value))
}

/// One row of a validation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    /// Field the rule reads and reports against
    pub field: Field,

    /// Check to run
    pub check: Check,

    /// Message shown when the check fails
    pub message: &'static str,

    /// Only applies when this payment method is selected
    pub payment: Option<PaymentMethod>,
}

const fn rule(field: Field, check: Check, message: &'static str) -> Rule {
    Rule {
        field,
        check,
        message,
        payment: None,
    }
}

const fn paying_by(method: PaymentMethod, rule: Rule) -> Rule {
    Rule {
        payment: Some(method),
        ..rule
    }
}

const ADDRESS_RULES: [Rule; 9] = [
    rule(Field::FullName, Check::Required, "Name is required"),
    rule(Field::Email, Check::Required, "Email is required"),
    rule(Field::Email, Check::Email, "Email is invalid"),
    rule(Field::Phone, Check::Required, "Phone is required"),
    rule(Field::Phone, Check::Phone, "Phone is invalid"),
    rule(Field::Line1, Check::Required, "Address line 1 is required"),
    rule(Field::City, Check::Required, "City is required"),
    rule(Field::State, Check::Required, "State is required"),
    rule(Field::PostalCode, Check::Required, "Postal code is required"),
];

const PAYMENT_RULES: [Rule; 7] = [
    paying_by(
        PaymentMethod::Card,
        rule(Field::CardNumber, Check::Required, "Card number is required"),
    ),
    paying_by(
        PaymentMethod::Card,
        rule(Field::CardNumber, Check::CardNumber, "Card number is invalid"),
    ),
    paying_by(
        PaymentMethod::Card,
        rule(Field::CardName, Check::Required, "Name on card is required"),
    ),
    paying_by(
        PaymentMethod::Card,
        rule(Field::ExpiryDate, Check::Required, "Expiry date is required"),
    ),
    paying_by(
        PaymentMethod::Card,
        rule(Field::Cvv, Check::Required, "CVV is required"),
    ),
    paying_by(
        PaymentMethod::Card,
        rule(Field::Cvv, Check::Cvv, "CVV is invalid"),
    ),
    paying_by(
        PaymentMethod::Upi,
        rule(Field::UpiId, Check::Required, "UPI ID is required"),
    ),
];

/// Validation table for a step. Shipping, review and success have no field rules.
#[must_use]
pub fn rules_for(step: CheckoutStep) -> &'static [Rule] {
    match step {
        CheckoutStep::Address => &ADDRESS_RULES,
        CheckoutStep::Payment => &PAYMENT_RULES,
        CheckoutStep::Shipping | CheckoutStep::Review | CheckoutStep::Success => &[],
    }
}

/// A failed rule.
pub type FieldError = (Field, &'static str);

/// Run the rules for `step` against `form`, returning at most one error per field.
#[must_use]
pub fn validate_step(step: CheckoutStep, form: &CheckoutForm) -> SmallVec<[FieldError; 4]> {
    let mut errors: SmallVec<[FieldError; 4]> = SmallVec::new();

    for rule in rules_for(step) {
        if rule
            .payment
            .is_some_and(|method| method != form.payment_method)
        {
            continue;
        }

        if errors.iter().any(|(field, _)| *field == rule.field) {
            continue;
        }

        if !rule.check.passes(form.value(rule.field)) {
            errors.push((rule.field, rule.message));
        }
    }

    errors
}
