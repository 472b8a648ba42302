//! Cart reconciliation: the server's item list is authoritative.

#![allow(clippy::unwrap_used)]

use rust_decimal::dec;
use shutterbay_client::{ApiClient, ApiSession};
use shutterbay_core::cart::{Cart, CartItem};
use shutterbay_core::types::ProductId;
use shutterbay_integration_tests::MockApi;

async fn signed_in_session(mock: &MockApi) -> ApiSession {
    let client = ApiClient::new(mock.url());
    let session = client.anonymous();
    session
        .login("ada@example.com", "hunter2hunter2")
        .await
        .unwrap();
    session
}

#[tokio::test]
async fn add_response_replaces_the_local_cart_wholesale() {
    let mock = MockApi::spawn().await;
    let session = signed_in_session(&mock).await;

    // Local cart has a line the server list will not contain.
    let mut cart = Cart::new();
    cart.add(CartItem {
        product_id: ProductId::new("local-only"),
        name: "Stale local line".to_owned(),
        price: dec!(9.99),
        image: String::new(),
        quantity: 1,
    });

    let added = CartItem {
        product_id: ProductId::new("p1"),
        name: "EOS R6".to_owned(),
        price: dec!(100),
        image: String::new(),
        quantity: 3,
    };
    let server_items = session.push_cart_add(&added).await.unwrap();
    cart.replace(server_items);

    // The server answered with the added line plus one of its own; the
    // stale local line is gone.
    assert_eq!(cart.line_count(), 2);
    assert!(cart
        .items()
        .iter()
        .all(|line| line.product_id != ProductId::new("local-only")));
    assert!(cart
        .items()
        .iter()
        .any(|line| line.product_id == ProductId::new("srv-extra")));
}

#[tokio::test]
async fn fetch_cart_returns_the_server_list() {
    let mock = MockApi::spawn().await;
    let session = signed_in_session(&mock).await;

    let items = session.fetch_cart().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_id, ProductId::new("p1"));
    assert_eq!(items[0].price, dec!(100));
}

#[tokio::test]
async fn quantity_update_round_trips() {
    let mock = MockApi::spawn().await;
    let session = signed_in_session(&mock).await;

    let items = session
        .push_cart_quantity(&ProductId::new("p1"), 5)
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 5);
}

#[tokio::test]
async fn remove_and_clear_empty_the_server_cart() {
    let mock = MockApi::spawn().await;
    let session = signed_in_session(&mock).await;

    let items = session.push_cart_remove(&ProductId::new("p1")).await.unwrap();
    assert!(items.is_empty());

    session.push_cart_clear().await.unwrap();
}
