//! Catalog caching: listings are cached, search is not, and admin
//! mutations invalidate everything.

#![allow(clippy::unwrap_used)]

use shutterbay_client::ApiClient;
use shutterbay_client::types::ProductInput;
use shutterbay_integration_tests::MockApi;

#[tokio::test]
async fn repeated_listings_hit_the_server_once() {
    let mock = MockApi::spawn().await;
    let client = ApiClient::new(mock.url());
    let session = client.anonymous();

    let first = session.products().await.unwrap();
    let second = session.products().await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    assert_eq!(mock.products_calls(), 1);
}

#[tokio::test]
async fn cache_is_shared_across_sessions_of_one_client() {
    let mock = MockApi::spawn().await;
    let client = ApiClient::new(mock.url());

    client.anonymous().products().await.unwrap();
    client.anonymous().products().await.unwrap();

    assert_eq!(mock.products_calls(), 1);
}

#[tokio::test]
async fn search_always_reaches_the_server() {
    let mock = MockApi::spawn().await;
    let session = ApiClient::new(mock.url()).anonymous();

    session.search_products("eos").await.unwrap();
    session.search_products("eos").await.unwrap();

    assert_eq!(mock.search_calls(), 2);
}

#[tokio::test]
async fn product_mutation_invalidates_the_listing_cache() {
    let mock = MockApi::spawn().await;
    let client = ApiClient::new(mock.url());
    let session = client.anonymous();
    session
        .login("ada@example.com", "hunter2hunter2")
        .await
        .unwrap();

    session.products().await.unwrap();
    assert_eq!(mock.products_calls(), 1);

    let input = ProductInput {
        name: "EOS R5".to_owned(),
        brand: "Canon".to_owned(),
        category: "Cameras".to_owned(),
        price: "3899.99".parse().unwrap(),
        discount: None,
        stock: 3,
        description: String::new(),
        image: "https://img.example/r5.jpg".to_owned(),
        images: Vec::new(),
        top_seller: false,
        specifications: std::collections::BTreeMap::new(),
    };
    session.create_product(&input).await.unwrap();

    // The next listing misses the cache and goes upstream again.
    session.products().await.unwrap();
    assert_eq!(mock.products_calls(), 2);
}
