//! Integration tests for delivery address redaction.
//!
//! Revealing an address starts a timer; when it fires, the stored address is
//! overwritten with a placeholder. The tests use a short delay and reopen the
//! profile from disk to check what was actually persisted.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use rust_decimal::Decimal;

use anonshop_core::{
    Currency, CustomerId, DeliveryAddress, OrderId, OrderStatus, ProductId, Pseudonym,
    REDACTED_PLACEHOLDER,
};
use anonshop_integration_tests::TempProfile;
use anonshop_storefront::db::OrderRepository;
use anonshop_storefront::models::{NewOrder, Order, OrderItem};
use anonshop_storefront::storage::Storage;

const DELAY: Duration = Duration::from_millis(200);

fn place_order(storage: &Storage) -> Order {
    OrderRepository::new(storage)
        .create(NewOrder {
            customer_id: CustomerId::generate(),
            vendor_pseudonym: Pseudonym::from_stored("crypto_dealer"),
            customer_code: "CUST-TESTTEST01".to_owned(),
            items: vec![OrderItem {
                product_id: ProductId::new("demo-1"),
                title: "Privacy Guide PDF".to_owned(),
                price: Decimal::new(5, 2),
                quantity: 1,
            }],
            total_amount: Decimal::new(5, 2),
            currency: Currency::XMR,
            status: OrderStatus::Paid,
            payment_address: "4testaddress".to_owned(),
            tx_hash: Some("0xabc".to_owned()),
            delivery_address: DeliveryAddress::new(
                "Jane Doe",
                "Main Street 1",
                "Berlin",
                "10115",
                "Germany",
            ),
            paid_at: Some(chrono::Utc::now()),
        })
        .unwrap()
}

// =============================================================================
// Reveal and Redact
// =============================================================================

#[tokio::test]
async fn test_revealed_address_is_wiped_after_delay() {
    let profile = TempProfile::new();
    let state = profile.state(DELAY).unwrap();
    let order = place_order(state.storage());
    assert!(!order.delivery_address.is_visible);

    let revealed = state.redaction().reveal(&order.id).unwrap().unwrap();
    assert_eq!(revealed.order.delivery_address.name, "Jane Doe");
    assert!(revealed.order.delivery_address.is_visible);
    assert!(revealed.order.delivery_address.viewed_at.is_some());

    // Still readable before the timer fires
    let stored = profile.open().unwrap();
    let before = OrderRepository::new(&stored).get(&order.id).unwrap().unwrap();
    assert_eq!(before.delivery_address.street, "Main Street 1");

    revealed.redaction.unwrap().await.unwrap();

    let stored = profile.open().unwrap();
    let after = OrderRepository::new(&stored).get(&order.id).unwrap().unwrap();
    let address = &after.delivery_address;
    assert!(address.is_redacted());
    assert!(address.is_visible);
    for field in [
        &address.name,
        &address.street,
        &address.city,
        &address.postal_code,
        &address.country,
    ] {
        assert_eq!(field, REDACTED_PLACEHOLDER);
    }

    // The rest of the order is untouched
    assert_eq!(after.status, OrderStatus::Paid);
    assert_eq!(after.total_amount, Decimal::new(5, 2));
}

#[tokio::test]
async fn test_second_reveal_schedules_nothing() {
    let profile = TempProfile::new();
    let state = profile.state(DELAY).unwrap();
    let order = place_order(state.storage());

    let first = state.redaction().reveal(&order.id).unwrap().unwrap();
    let second = state.redaction().reveal(&order.id).unwrap().unwrap();
    assert!(second.redaction.is_none());
    assert_eq!(
        second.order.delivery_address.viewed_at,
        first.order.delivery_address.viewed_at
    );

    first.redaction.unwrap().await.unwrap();

    // Revealing a wiped address shows the placeholder and schedules nothing
    let third = state.redaction().reveal(&order.id).unwrap().unwrap();
    assert!(third.redaction.is_none());
    assert!(third.order.delivery_address.is_redacted());
}

#[tokio::test]
async fn test_reveal_unknown_order() {
    let profile = TempProfile::new();
    let state = profile.state(DELAY).unwrap();

    let result = state.redaction().reveal(&OrderId::new("order-missing")).unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_redaction_only_touches_its_order() {
    let profile = TempProfile::new();
    let state = profile.state(DELAY).unwrap();
    let first = place_order(state.storage());
    let second = place_order(state.storage());

    let revealed = state.redaction().reveal(&first.id).unwrap().unwrap();
    revealed.redaction.unwrap().await.unwrap();

    let orders = OrderRepository::new(state.storage());
    let untouched = orders.get(&second.id).unwrap().unwrap();
    assert!(!untouched.delivery_address.is_visible);
    assert_eq!(untouched.delivery_address.name, "Jane Doe");
    assert!(orders.get(&first.id).unwrap().unwrap().delivery_address.is_redacted());
}
