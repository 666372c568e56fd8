//! Integration test for the full cart-to-order path.
//!
//! A shopper adds the tea caddy twice (₹500 each), walks through checkout with standard shipping
//! (₹49) and cash on delivery, and places the order:
//!
//! - Subtotal: 2 × ₹500 = ₹1,000
//! - Shipping: ₹49
//! - Total: ₹1,049
//!
//! After the backend confirms, the persisted cart is empty and checkout sits on step 5.

use rust_decimal::Decimal;
use serde_json::Map;
use testresult::TestResult;

use storefront::prelude::*;

fn fill_address(checkout: &mut Checkout) -> Result<(), CheckoutError> {
    checkout.set_field(Field::FullName, "Asha Rao")?;
    checkout.set_field(Field::Email, "asha@example.com")?;
    checkout.set_field(Field::Phone, "9876543210")?;
    checkout.set_field(Field::Line1, "12 MG Road")?;
    checkout.set_field(Field::City, "Bengaluru")?;
    checkout.set_field(Field::State, "Karnataka")?;
    checkout.set_field(Field::PostalCode, "560001")
}

#[test]
fn order_success_clears_cart_and_reaches_step_five() -> TestResult {
    let mut fixture = Fixture::new();

    fixture.load_products("home")?;

    let cart = CartStore::new(MemoryStore::new());
    let caddy = fixture.product("tea-caddy")?;

    cart.add_to_cart(caddy, 1);
    cart.add_to_cart(caddy, 1);

    let items = cart.get_cart();

    assert_eq!(items.len(), 1);
    assert_eq!(cart.cart_total(), Decimal::from(1000));

    let mut checkout = Checkout::new(items, None);

    fill_address(&mut checkout)?;

    assert_eq!(checkout.next()?, CheckoutStep::Shipping);
    assert_eq!(checkout.next()?, CheckoutStep::Payment);
    assert_eq!(checkout.next()?, CheckoutStep::Review);

    let totals = checkout.totals()?;

    assert_eq!(totals.subtotal().to_minor_units(), 1000_00);
    assert_eq!(totals.shipping_fee().to_minor_units(), 49_00);
    assert_eq!(totals.total().to_minor_units(), 1049_00);

    let payload = checkout.begin_submission()?;

    assert_eq!(payload.final_amount, Decimal::from(1049));

    checkout.complete(OrderConfirmation {
        order_number: "ORD-1001".to_string(),
        final_amount: Some(payload.final_amount),
        payment_method: Some(payload.payment_method),
        extra: Map::new(),
    })?;
    cart.clear_cart();

    assert!(cart.get_cart().is_empty());
    assert_eq!(checkout.step(), CheckoutStep::Success);
    assert_eq!(checkout.step().number(), 5);

    Ok(())
}

#[test]
fn cart_round_trips_through_file_storage() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut fixture = Fixture::new();

    fixture.load_products("home")?;

    let added = CartStore::new(FileStore::open(dir.path())?)
        .add_to_cart(fixture.product("brass-lamp")?, 2);

    let reloaded = CartStore::new(FileStore::open(dir.path())?).get_cart();

    assert_eq!(reloaded, added);
    assert_eq!(
        reloaded.first().map(|line| line.subtotal),
        Some(Decimal::new(2208_30, 2))
    );

    Ok(())
}

#[test]
fn stock_shortfall_blocks_checkout() -> TestResult {
    let mut fixture = Fixture::new();

    fixture.load_products("home")?;

    let cart = CartStore::new(MemoryStore::new());
    let items = cart.add_to_cart(fixture.product("tea-caddy")?, 5);

    let mut ledger = StockLedger::new();

    ledger.record(
        "tea-caddy",
        StockCheck {
            available: false,
            stock_quantity: 2,
        },
    );

    let blocked = checkout_gate(&items, &ledger);

    assert!(
        blocked
            .as_ref()
            .err()
            .is_some_and(|err| err.to_string().contains("Only 2 available"))
    );

    let items = cart.update_cart_item_quantity("tea-caddy", 2);

    ledger.record(
        "tea-caddy",
        StockCheck {
            available: true,
            stock_quantity: 2,
        },
    );

    assert_eq!(checkout_gate(&items, &ledger), Ok(()));

    Ok(())
}

#[test]
fn welcome_coupon_is_capped_in_cart_and_checkout() -> TestResult {
    let mut fixture = Fixture::new();

    fixture.load_products("home")?;

    let cart = CartStore::new(MemoryStore::new());

    // 5 throws at ₹1,960 each (20% off ₹2,450) = ₹9,800
    let items = cart.add_to_cart(fixture.product("cotton-throw")?, 5);

    let mut coupon = CouponState::default();

    coupon.apply("welcome20")?;

    let cart_totals = price_cart(&items, coupon.applied(), None)?;

    assert_eq!(cart_totals.subtotal().to_minor_units(), 9800_00);
    assert_eq!(cart_totals.discount().to_minor_units(), 500_00);

    let checkout = Checkout::new(items, coupon.applied().cloned());

    assert_eq!(checkout.totals()?.discount(), cart_totals.discount());
    assert_eq!(checkout.totals()?.total().to_minor_units(), 9349_00);

    Ok(())
}
