//! Order fulfillment through the admin endpoints.

#![allow(clippy::unwrap_used)]

use shutterbay_client::{ApiClient, ApiError, ApiSession};
use shutterbay_core::types::{OrderId, OrderStatus};
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
async fn order_listing_parses_both_open_and_terminal_orders() {
    let mock = MockApi::spawn().await;
    let session = signed_in_session(&mock).await;

    let orders = session.admin_orders().await.unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].status, OrderStatus::Pending);
    assert!(orders[0].user.is_some());
    assert_eq!(orders[1].status, OrderStatus::Delivered);
    assert!(orders[1].user.is_none());
}

#[tokio::test]
async fn open_order_status_update_reaches_the_server() {
    let mock = MockApi::spawn().await;
    let session = signed_in_session(&mock).await;

    let message = session
        .update_order_status(
            &OrderId::new("ord-1"),
            OrderStatus::Pending,
            OrderStatus::Shipped,
        )
        .await
        .unwrap();

    assert_eq!(message, "Order status updated");
    assert_eq!(mock.status_calls(), 1);
}

#[tokio::test]
async fn delivered_order_update_is_rejected_before_any_request() {
    let mock = MockApi::spawn().await;
    let session = signed_in_session(&mock).await;

    let err = session
        .update_order_status(
            &OrderId::new("ord-2"),
            OrderStatus::Delivered,
            OrderStatus::Shipped,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(mock.status_calls(), 0);
}
