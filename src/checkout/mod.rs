//! Checkout
//!
//! A strictly linear five-step flow: address, shipping, payment, review, success. Moving forward
//! requires the current step's fields to validate; moving back never does. Placing the order is
//! split into [`Checkout::begin_submission`] and [`Checkout::complete`] / [`Checkout::fail`] so the
//! caller can await the backend in between while the machine rejects a second submission.

use std::{fmt, io};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cart::CartItem,
    coupons::Coupon,
    pricing::{PriceBreakdown, PricingError, price_cart},
    shipping::ShippingMethod,
    users::User,
};

pub mod form;
pub mod order;
pub mod summary;
pub mod validation;

use form::{CheckoutForm, Field, PaymentMethod};
use order::{OrderConfirmation, OrderPayload};
use validation::{rules_for, validate_step};

/// Checkout steps, numbered as shown to the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CheckoutStep {
    /// Contact details and delivery address
    Address = 1,

    /// Shipping tier
    Shipping = 2,

    /// Payment method and details
    Payment = 3,

    /// Final review and notes
    Review = 4,

    /// Order placed
    Success = 5,
}

impl CheckoutStep {
    /// Step number, `1..=5`.
    #[must_use]
    pub fn number(self) -> u8 {
        self as u8
    }

    /// Step title.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CheckoutStep::Address => "Address",
            CheckoutStep::Shipping => "Shipping",
            CheckoutStep::Payment => "Payment",
            CheckoutStep::Review => "Review",
            CheckoutStep::Success => "Success",
        }
    }

    fn following(self) -> Option<Self> {
        match self {
            CheckoutStep::Address => Some(CheckoutStep::Shipping),
            CheckoutStep::Shipping => Some(CheckoutStep::Payment),
            CheckoutStep::Payment => Some(CheckoutStep::Review),
            CheckoutStep::Review | CheckoutStep::Success => None,
        }
    }

    fn preceding(self) -> Option<Self> {
        match self {
            CheckoutStep::Shipping => Some(CheckoutStep::Address),
            CheckoutStep::Payment => Some(CheckoutStep::Shipping),
            CheckoutStep::Review => Some(CheckoutStep::Payment),
            CheckoutStep::Address | CheckoutStep::Success => None,
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.label())
    }
}

/// Errors raised by the checkout flow.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// Fields on a step failed validation.
    #[error("{step} has invalid fields: {fields:?}")]
    Validation {
        /// Step that failed
        step: CheckoutStep,

        /// Fields with errors
        fields: SmallVec<[Field; 4]>,
    },

    /// `next` has nowhere to go from this step.
    #[error("cannot advance from {0}")]
    CannotAdvance(CheckoutStep),

    /// Edit links only jump back to earlier steps.
    #[error("cannot jump from {from} to {to}")]
    StepLocked {
        /// Current step
        from: CheckoutStep,

        /// Requested step
        to: CheckoutStep,
    },

    /// Orders are placed from the review step only.
    #[error("orders can only be placed from review, not {0}")]
    NotAtReview(CheckoutStep),

    /// An order submission is already in flight.
    #[error("order submission already in progress")]
    AlreadySubmitting,

    /// Review only accepts order notes; edit links lead back to the other fields.
    #[error("{field} cannot be edited on {step}")]
    FieldLocked {
        /// Current step
        step: CheckoutStep,

        /// Field that was edited
        field: Field,
    },

    /// The order has been placed.
    #[error("order already placed")]
    Completed,

    /// There is no submission to complete.
    #[error("no order submission in progress")]
    NotSubmitting,

    /// The cart snapshot is empty.
    #[error("Your cart is empty")]
    EmptyCart,

    /// Totals could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Writing the review summary failed.
    #[error("failed to write order summary")]
    Io,
}

/// Checkout state machine over a snapshot of the cart.
#[derive(Debug, Clone)]
pub struct Checkout {
    step: CheckoutStep,
    form: CheckoutForm,
    errors: FxHashMap<Field, &'static str>,
    items: Vec<CartItem>,
    coupon: Option<Coupon>,
    submitting: bool,
    submit_error: Option<String>,
    confirmation: Option<OrderConfirmation>,
}

impl Checkout {
    /// Start checkout at the address step.
    #[must_use]
    pub fn new(items: Vec<CartItem>, coupon: Option<Coupon>) -> Self {
        Self {
            step: CheckoutStep::Address,
            form: CheckoutForm::default(),
            errors: FxHashMap::default(),
            items,
            coupon,
            submitting: false,
            submit_error: None,
            confirmation: None,
        }
    }

    /// Prefill contact details from the signed-in user.
    #[must_use]
    pub fn with_user(mut self, user: Option<&User>) -> Self {
        if let Some(user) = user {
            self.form.prefill(user);
        }

        self
    }

    /// Current step
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Form contents
    pub fn form(&self) -> &CheckoutForm {
        &self.form
    }

    /// Cart snapshot being checked out
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Coupon carried over from the cart
    pub fn coupon(&self) -> Option<&Coupon> {
        self.coupon.as_ref()
    }

    /// Error shown against a field.
    pub fn error(&self, field: Field) -> Option<&'static str> {
        self.errors.get(&field).copied()
    }

    /// All field errors.
    pub fn errors(&self) -> &FxHashMap<Field, &'static str> {
        &self.errors
    }

    /// Whether an order submission is in flight.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Retryable error from the last failed submission.
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// Backend confirmation once the order is placed.
    pub fn confirmation(&self) -> Option<&OrderConfirmation> {
        self.confirmation.as_ref()
    }

    /// Update a field, clearing only that field's error.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::FieldLocked`] for anything but notes on review,
    /// [`CheckoutError::AlreadySubmitting`] while an order is in flight and
    /// [`CheckoutError::Completed`] once it is placed.
    pub fn set_field(
        &mut self,
        field: Field,
        value: impl Into<String>,
    ) -> Result<(), CheckoutError> {
        self.ensure_editable()?;

        if self.step == CheckoutStep::Review && field != Field::Notes {
            return Err(CheckoutError::FieldLocked {
                step: self.step,
                field,
            });
        }

        *self.form.value_mut(field) = value.into();

        self.errors.remove(&field);

        Ok(())
    }

    /// Choose a shipping tier.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::AlreadySubmitting`] or [`CheckoutError::Completed`].
    pub fn set_shipping_method(&mut self, method: ShippingMethod) -> Result<(), CheckoutError> {
        self.ensure_editable()?;

        self.form.shipping_method = method;

        Ok(())
    }

    /// Choose a payment method. Errors from the previous method's fields no longer apply.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::AlreadySubmitting`] or [`CheckoutError::Completed`].
    pub fn set_payment_method(&mut self, method: PaymentMethod) -> Result<(), CheckoutError> {
        self.ensure_editable()?;

        self.form.payment_method = method;

        for rule in rules_for(CheckoutStep::Payment) {
            self.errors.remove(&rule.field);
        }

        Ok(())
    }

    /// Totals for the current shipping method and coupon.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Pricing`] if the totals cannot be computed.
    pub fn totals(&self) -> Result<PriceBreakdown, CheckoutError> {
        Ok(price_cart(
            &self.items,
            self.coupon.as_ref(),
            Some(self.form.shipping_method),
        )?)
    }

    /// Validate the current step and advance.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] and stays put if the step's fields are invalid, or
    /// [`CheckoutError::CannotAdvance`] from review and success.
    pub fn next(&mut self) -> Result<CheckoutStep, CheckoutError> {
        if self.submitting {
            return Err(CheckoutError::AlreadySubmitting);
        }

        let following = self
            .step
            .following()
            .ok_or(CheckoutError::CannotAdvance(self.step))?;

        self.validate(self.step)?;

        debug!(from = %self.step, to = %following, "checkout advanced");

        self.step = following;

        Ok(self.step)
    }

    /// Step back one step. Address stays on address.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::AlreadySubmitting`] while an order is in flight, or
    /// [`CheckoutError::StepLocked`] once the order is placed.
    pub fn previous(&mut self) -> Result<CheckoutStep, CheckoutError> {
        let target = self.step.preceding().unwrap_or(CheckoutStep::Address);

        self.go_to(target)
    }

    /// Jump back to an earlier step (or stay on the current one), keeping everything entered.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::StepLocked`] for a forward jump or once the order is placed, and
    /// [`CheckoutError::AlreadySubmitting`] while an order is in flight.
    pub fn go_to(&mut self, target: CheckoutStep) -> Result<CheckoutStep, CheckoutError> {
        if self.submitting {
            return Err(CheckoutError::AlreadySubmitting);
        }

        if self.step == CheckoutStep::Success || target > self.step {
            return Err(CheckoutError::StepLocked {
                from: self.step,
                to: target,
            });
        }

        self.step = target;

        Ok(self.step)
    }

    /// Start placing the order.
    ///
    /// Re-validates the address and payment steps, computes totals and assembles the payload,
    /// then marks the machine as submitting until [`Checkout::complete`] or [`Checkout::fail`].
    /// If a step no longer validates, the machine moves back to it so the errors are visible.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::AlreadySubmitting`] for a second call while one is in flight,
    /// [`CheckoutError::NotAtReview`] outside the review step, [`CheckoutError::EmptyCart`],
    /// [`CheckoutError::Validation`] or [`CheckoutError::Pricing`].
    pub fn begin_submission(&mut self) -> Result<OrderPayload, CheckoutError> {
        if self.submitting {
            return Err(CheckoutError::AlreadySubmitting);
        }

        if self.step != CheckoutStep::Review {
            return Err(CheckoutError::NotAtReview(self.step));
        }

        if self.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        for step in [CheckoutStep::Address, CheckoutStep::Payment] {
            if let Err(error) = self.validate(step) {
                self.step = step;

                return Err(error);
            }
        }

        let totals = self.totals()?;
        let payload =
            OrderPayload::assemble(&self.items, &self.form, self.coupon.as_ref(), &totals);

        self.submitting = true;
        self.submit_error = None;

        debug!(
            lines = payload.items.len(),
            final_amount = %payload.final_amount,
            "order submission started"
        );

        Ok(payload)
    }

    /// Record a successful submission and move to success.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotSubmitting`] if no submission is in flight.
    pub fn complete(
        &mut self,
        confirmation: OrderConfirmation,
    ) -> Result<CheckoutStep, CheckoutError> {
        if !self.submitting {
            return Err(CheckoutError::NotSubmitting);
        }

        self.submitting = false;
        self.confirmation = Some(confirmation);
        self.step = CheckoutStep::Success;

        Ok(self.step)
    }

    /// Record a failed submission. The step and form are kept so the shopper can retry.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();

        warn!(%message, "order submission failed");

        self.submitting = false;
        self.submit_error = Some(message);
    }

    /// Drop an in-flight submission without recording its outcome. The step and form stay as
    /// they were.
    pub fn abandon(&mut self) {
        if self.submitting {
            debug!("order submission abandoned");
        }

        self.submitting = false;
    }

    /// Render the review summary.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Pricing`] or [`CheckoutError::Io`].
    pub fn write_summary(&self, out: impl io::Write) -> Result<(), CheckoutError> {
        summary::write_summary(out, &self.items, &self.totals()?)
    }

    fn ensure_editable(&self) -> Result<(), CheckoutError> {
        if self.submitting {
            return Err(CheckoutError::AlreadySubmitting);
        }

        if self.step == CheckoutStep::Success {
            return Err(CheckoutError::Completed);
        }

        Ok(())
    }

    fn validate(&mut self, step: CheckoutStep) -> Result<(), CheckoutError> {
        for rule in rules_for(step) {
            self.errors.remove(&rule.field);
        }

        let failed = validate_step(step, &self.form);

        if failed.is_empty() {
            return Ok(());
        }

        let fields = failed.iter().map(|(field, _)| *field).collect();

        self.errors.extend(failed);

        Err(CheckoutError::Validation { step, fields })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::Map;
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::coupons::find_coupon;

    use super::*;

    fn line(product_id: &str, price: i64, quantity: u32) -> CartItem {
        let mut item = CartItem {
            id: Uuid::new_v4(),
            product_id: product_id.to_string(),
            name: product_id.to_uppercase(),
            price: Decimal::from(price),
            discounted_price: None,
            image: None,
            quantity,
            subtotal: Decimal::ZERO,
        };

        item.refresh_subtotal();
        item
    }

    fn fill_address(checkout: &mut Checkout) -> Result<(), CheckoutError> {
        checkout.set_field(Field::FullName, "Asha Rao")?;
        checkout.set_field(Field::Email, "asha@example.com")?;
        checkout.set_field(Field::Phone, "9876543210")?;
        checkout.set_field(Field::Line1, "12 MG Road")?;
        checkout.set_field(Field::City, "Bengaluru")?;
        checkout.set_field(Field::State, "Karnataka")?;
        checkout.set_field(Field::PostalCode, "560001")
    }

    fn at_review() -> Result<Checkout, CheckoutError> {
        let mut checkout = Checkout::new(vec![line("p1", 500, 2)], None);

        fill_address(&mut checkout)?;
        checkout.next()?;
        checkout.next()?;
        checkout.next()?;

        Ok(checkout)
    }

    fn confirmation() -> OrderConfirmation {
        OrderConfirmation {
            order_number: "ORD-1".to_string(),
            final_amount: Some(Decimal::from(1049)),
            payment_method: Some(PaymentMethod::Cod),
            extra: Map::new(),
        }
    }

    #[test]
    fn empty_email_blocks_address_step_until_corrected() -> TestResult {
        let mut checkout = Checkout::new(vec![line("p1", 500, 1)], None);

        fill_address(&mut checkout)?;
        checkout.set_field(Field::Email, "")?;

        let result = checkout.next();

        assert!(matches!(
            result,
            Err(CheckoutError::Validation { step: CheckoutStep::Address, ref fields })
                if fields.as_slice() == [Field::Email]
        ));
        assert_eq!(checkout.step(), CheckoutStep::Address);
        assert_eq!(checkout.error(Field::Email), Some("Email is required"));

        checkout.set_field(Field::Email, "asha@example.com")?;

        assert_eq!(checkout.error(Field::Email), None);
        assert_eq!(checkout.next()?, CheckoutStep::Shipping);

        Ok(())
    }

    #[test]
    fn editing_a_field_clears_only_its_error() -> TestResult {
        let mut checkout = Checkout::new(Vec::new(), None);

        assert!(checkout.next().is_err());

        checkout.set_field(Field::City, "Pune")?;

        assert_eq!(checkout.error(Field::City), None);
        assert_eq!(checkout.error(Field::FullName), Some("Name is required"));
        assert_eq!(checkout.error(Field::PostalCode), Some("Postal code is required"));

        Ok(())
    }

    #[test]
    fn review_only_accepts_notes() -> TestResult {
        let mut checkout = at_review()?;

        assert_eq!(
            checkout.set_field(Field::City, "Pune"),
            Err(CheckoutError::FieldLocked {
                step: CheckoutStep::Review,
                field: Field::City,
            })
        );
        assert_eq!(checkout.form().city, "Bengaluru");

        checkout.set_field(Field::Notes, "Leave at the gate")?;

        checkout.go_to(CheckoutStep::Address)?;
        checkout.set_field(Field::City, "Pune")?;

        assert_eq!(checkout.form().city, "Pune");
        assert_eq!(checkout.form().notes, "Leave at the gate");

        Ok(())
    }

    #[test]
    fn form_is_frozen_while_submitting_and_after_success() -> TestResult {
        let mut checkout = at_review()?;

        checkout.begin_submission()?;

        assert_eq!(
            checkout.set_field(Field::Notes, "late note"),
            Err(CheckoutError::AlreadySubmitting)
        );
        assert_eq!(
            checkout.set_payment_method(PaymentMethod::Upi),
            Err(CheckoutError::AlreadySubmitting)
        );

        checkout.complete(confirmation())?;

        assert_eq!(
            checkout.set_field(Field::Notes, "late note"),
            Err(CheckoutError::Completed)
        );
        assert_eq!(
            checkout.set_shipping_method(ShippingMethod::Overnight),
            Err(CheckoutError::Completed)
        );
        assert_eq!(checkout.form().notes, "");
        assert_eq!(checkout.form().payment_method, PaymentMethod::Cod);

        Ok(())
    }

    #[test]
    fn prefill_uses_signed_in_user() {
        let user = User {
            name: Some("Asha Rao".to_string()),
            email: Some("asha@example.com".to_string()),
            ..User::default()
        };

        let checkout = Checkout::new(Vec::new(), None).with_user(Some(&user));

        assert_eq!(checkout.form().full_name, "Asha Rao");
        assert_eq!(checkout.form().email, "asha@example.com");
    }

    #[test]
    fn card_payment_blocks_until_details_are_valid() -> TestResult {
        let mut checkout = Checkout::new(vec![line("p1", 100, 1)], None);

        fill_address(&mut checkout)?;
        checkout.next()?;
        checkout.next()?;
        checkout.set_payment_method(PaymentMethod::Card)?;

        assert!(checkout.next().is_err());
        assert_eq!(checkout.step(), CheckoutStep::Payment);
        assert_eq!(checkout.error(Field::CardNumber), Some("Card number is required"));

        checkout.set_payment_method(PaymentMethod::Cod)?;

        assert_eq!(checkout.error(Field::CardNumber), None);
        assert_eq!(checkout.next()?, CheckoutStep::Review);

        Ok(())
    }

    #[test]
    fn edit_links_only_jump_backwards() -> TestResult {
        let mut checkout = at_review()?;

        checkout.set_field(Field::Notes, "Ring twice")?;

        assert_eq!(checkout.go_to(CheckoutStep::Shipping)?, CheckoutStep::Shipping);
        assert_eq!(checkout.form().notes, "Ring twice");
        assert_eq!(
            checkout.go_to(CheckoutStep::Review),
            Err(CheckoutError::StepLocked {
                from: CheckoutStep::Shipping,
                to: CheckoutStep::Review,
            })
        );
        assert_eq!(checkout.previous()?, CheckoutStep::Address);
        assert_eq!(checkout.previous()?, CheckoutStep::Address);

        Ok(())
    }

    #[test]
    fn review_cannot_advance_with_next() -> TestResult {
        let mut checkout = at_review()?;

        assert_eq!(
            checkout.next(),
            Err(CheckoutError::CannotAdvance(CheckoutStep::Review))
        );

        Ok(())
    }

    #[test]
    fn submission_totals_match_order_success_scenario() -> TestResult {
        let mut checkout = at_review()?;

        let payload = checkout.begin_submission()?;

        assert_eq!(payload.total_amount, Decimal::from(1000));
        assert_eq!(payload.shipping_amount, Decimal::from(49));
        assert_eq!(payload.final_amount, Decimal::from(1049));
        assert_eq!(payload.discount_amount, Decimal::ZERO);
        assert!(checkout.is_submitting());

        assert_eq!(checkout.complete(confirmation())?, CheckoutStep::Success);
        assert!(!checkout.is_submitting());
        assert_eq!(
            checkout.confirmation().map(|c| c.order_number.as_str()),
            Some("ORD-1")
        );

        Ok(())
    }

    #[test]
    fn second_submission_is_rejected_while_in_flight() -> TestResult {
        let mut checkout = at_review()?;

        checkout.begin_submission()?;

        assert_eq!(
            checkout.begin_submission(),
            Err(CheckoutError::AlreadySubmitting)
        );
        assert_eq!(checkout.previous(), Err(CheckoutError::AlreadySubmitting));

        Ok(())
    }

    #[test]
    fn failure_keeps_step_and_allows_retry() -> TestResult {
        let mut checkout = at_review()?;

        checkout.begin_submission()?;
        checkout.fail("Failed to place order. Please try again.");

        assert_eq!(checkout.step(), CheckoutStep::Review);
        assert!(!checkout.is_submitting());
        assert_eq!(
            checkout.submit_error(),
            Some("Failed to place order. Please try again.")
        );

        checkout.begin_submission()?;

        assert_eq!(checkout.submit_error(), None);

        Ok(())
    }

    #[test]
    fn submission_revalidates_and_returns_to_failing_step() -> TestResult {
        let mut checkout = at_review()?;

        checkout.set_payment_method(PaymentMethod::Upi)?;

        let result = checkout.begin_submission();

        assert!(matches!(
            result,
            Err(CheckoutError::Validation {
                step: CheckoutStep::Payment,
                ..
            })
        ));
        assert_eq!(checkout.step(), CheckoutStep::Payment);
        assert_eq!(checkout.error(Field::UpiId), Some("UPI ID is required"));
        assert!(!checkout.is_submitting());

        Ok(())
    }

    #[test]
    fn abandoned_submission_can_be_restarted() -> TestResult {
        let mut checkout = at_review()?;

        checkout.begin_submission()?;
        checkout.abandon();

        assert!(!checkout.is_submitting());
        assert_eq!(checkout.step(), CheckoutStep::Review);
        assert!(checkout.confirmation().is_none());
        assert_eq!(checkout.submit_error(), None);
        assert_eq!(
            checkout.complete(confirmation()),
            Err(CheckoutError::NotSubmitting)
        );

        checkout.begin_submission()?;

        Ok(())
    }

    #[test]
    fn complete_without_submission_is_rejected() {
        let mut checkout = Checkout::new(Vec::new(), None);

        assert_eq!(
            checkout.complete(confirmation()),
            Err(CheckoutError::NotSubmitting)
        );
        assert_eq!(checkout.step(), CheckoutStep::Address);
    }

    #[test]
    fn success_is_terminal() -> TestResult {
        let mut checkout = at_review()?;

        checkout.begin_submission()?;
        checkout.complete(confirmation())?;

        assert!(checkout.previous().is_err());
        assert!(checkout.next().is_err());
        assert_eq!(checkout.step(), CheckoutStep::Success);

        Ok(())
    }

    #[test]
    fn coupon_carries_into_checkout_totals() -> TestResult {
        let mut checkout = Checkout::new(vec![line("p1", 500, 2)], find_coupon("FREESHIP"));

        checkout.set_shipping_method(ShippingMethod::Overnight)?;

        let totals = checkout.totals()?;

        assert_eq!(totals.shipping_fee().to_minor_units(), 0);
        assert_eq!(totals.total().to_minor_units(), 1000_00);

        Ok(())
    }

    #[test]
    fn steps_are_numbered_one_to_five() {
        assert_eq!(CheckoutStep::Address.number(), 1);
        assert_eq!(CheckoutStep::Success.number(), 5);
        assert_eq!(CheckoutStep::Review.to_string(), "4. Review");
    }
}
