//! Credential refresh behavior over real HTTP.

#![allow(clippy::unwrap_used)]

use shutterbay_client::{ApiClient, ApiError, ApiSession};
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
async fn expired_access_token_is_refreshed_and_the_request_replayed() {
    let mock = MockApi::spawn().await;
    let session = signed_in_session(&mock).await;

    mock.expire_access("access-2");

    let profile = session.profile().await.unwrap();
    assert_eq!(profile.email, "ada@example.com");

    // One refresh, and the original request went out twice.
    assert_eq!(mock.refresh_calls(), 1);
    assert_eq!(mock.profile_calls(), 2);

    // The refreshed token was installed on the session.
    let tokens = session.tokens().await.unwrap();
    assert_eq!(tokens.access_token, "access-2");
}

#[tokio::test]
async fn unauthorized_replay_is_not_refreshed_again() {
    let mock = MockApi::spawn().await;
    let session = signed_in_session(&mock).await;

    // Refresh succeeds but hands out a token the API still rejects.
    mock.expire_access("access-2");
    mock.poison_refresh();

    let err = session.profile().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));

    // Exactly one refresh and one replay; no loop.
    assert_eq!(mock.refresh_calls(), 1);
    assert_eq!(mock.profile_calls(), 2);
    assert!(!session.is_invalidated());
}

#[tokio::test]
async fn failed_refresh_invalidates_the_session() {
    let mock = MockApi::spawn().await;
    let session = signed_in_session(&mock).await;

    mock.expire_access("access-2");
    mock.break_refresh();

    let err = session.profile().await.unwrap_err();
    assert!(matches!(err, ApiError::SessionExpired));
    assert!(session.is_invalidated());
    assert!(session.tokens().await.is_none());
}

#[tokio::test]
async fn concurrent_requests_share_a_single_refresh() {
    let mock = MockApi::spawn().await;
    let session = signed_in_session(&mock).await;

    mock.expire_access("access-2");

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let session = session.clone();
        tasks.push(tokio::spawn(async move { session.profile().await }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    // Every task failed with the same stale token, so the gate collapses
    // them into one upstream refresh.
    assert_eq!(mock.refresh_calls(), 1);
}

#[tokio::test]
async fn anonymous_unauthorized_is_returned_without_refreshing() {
    let mock = MockApi::spawn().await;
    let session = ApiClient::new(mock.url()).anonymous();

    let err = session.profile().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
    assert_eq!(mock.refresh_calls(), 0);
}

#[tokio::test]
async fn login_installs_the_credential_pair() {
    let mock = MockApi::spawn().await;
    let session = signed_in_session(&mock).await;

    let tokens = session.tokens().await.unwrap();
    assert_eq!(tokens.access_token, shutterbay_integration_tests::INITIAL_ACCESS);
    assert_eq!(tokens.refresh_token, shutterbay_integration_tests::REFRESH_TOKEN);
    assert!(session.is_authenticated().await);
}
