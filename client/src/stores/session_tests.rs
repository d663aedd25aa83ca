//! Tests for the session store.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{AuthProviderError, MockAuthProvider};
use crate::domain::{EmailAddress, UserId};

fn credentials() -> Credentials {
    Credentials::try_from_parts("ada@example.com", "correct horse").expect("credentials shape")
}

fn identity() -> Identity {
    Identity::new(
        UserId::random(),
        EmailAddress::new("ada@example.com").expect("valid email"),
    )
}

#[tokio::test]
async fn sign_in_stores_the_returned_identity() {
    let expected = identity();
    let mut auth = MockAuthProvider::new();
    let returned = expected.clone();
    auth.expect_sign_in()
        .times(1)
        .return_once(move |_| Ok(returned));

    let store = SessionStore::new(Arc::new(auth));
    let signed_in = store.sign_in(&credentials()).await.expect("sign-in succeeds");

    assert_eq!(signed_in, expected);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.identity, Some(expected));
    assert_eq!(snapshot.status, AsyncStatus::Succeeded);
    assert!(snapshot.error.is_none());
}

#[tokio::test]
async fn sign_in_failure_records_the_message_and_keeps_the_identity() {
    let existing = identity();
    let mut auth = MockAuthProvider::new();
    auth.expect_sign_in()
        .times(1)
        .return_once(|_| Err(AuthProviderError::credentials("invalid login credentials")));

    let store = SessionStore::new(Arc::new(auth));
    store.set_identity(Some(existing.clone()));

    let err = store.sign_in(&credentials()).await.expect_err("sign-in fails");
    assert_eq!(err.to_string(), "invalid login credentials");

    let snapshot = store.snapshot();
    assert_eq!(snapshot.identity, Some(existing), "identity must be unchanged");
    assert_eq!(snapshot.status, AsyncStatus::Failed);
    assert_eq!(snapshot.error.as_deref(), Some("invalid login credentials"));
}

#[tokio::test]
async fn sign_up_stores_a_pending_identity_as_none() {
    let mut auth = MockAuthProvider::new();
    auth.expect_sign_up().times(1).return_once(|_| Ok(None));

    let store = SessionStore::new(Arc::new(auth));
    let returned = store.sign_up(&credentials()).await.expect("sign-up succeeds");

    assert!(returned.is_none());
    let snapshot = store.snapshot();
    assert!(snapshot.identity.is_none());
    assert_eq!(snapshot.status, AsyncStatus::Succeeded);
}

#[tokio::test]
async fn sign_up_stores_the_identity_when_a_session_is_established() {
    let expected = identity();
    let mut auth = MockAuthProvider::new();
    let returned = expected.clone();
    auth.expect_sign_up()
        .times(1)
        .return_once(move |_| Ok(Some(returned)));

    let store = SessionStore::new(Arc::new(auth));
    let signed_up = store.sign_up(&credentials()).await.expect("sign-up succeeds");

    assert_eq!(signed_up, Some(expected.clone()));
    assert_eq!(store.identity(), Some(expected));
}

#[tokio::test]
async fn sign_out_clears_the_identity() {
    let mut auth = MockAuthProvider::new();
    auth.expect_sign_out().times(1).return_once(|| Ok(()));

    let store = SessionStore::new(Arc::new(auth));
    store.set_identity(Some(identity()));

    store.sign_out().await.expect("sign-out succeeds");

    let snapshot = store.snapshot();
    assert!(snapshot.identity.is_none());
    assert_eq!(snapshot.status, AsyncStatus::Succeeded);
}

#[tokio::test]
async fn failed_sign_out_keeps_the_identity() {
    let existing = identity();
    let mut auth = MockAuthProvider::new();
    auth.expect_sign_out()
        .times(1)
        .return_once(|| Err(AuthProviderError::transport("connection reset")));

    let store = SessionStore::new(Arc::new(auth));
    store.set_identity(Some(existing.clone()));

    let err = store.sign_out().await.expect_err("sign-out fails");
    assert!(err.to_string().contains("connection reset"));

    let snapshot = store.snapshot();
    assert_eq!(
        snapshot.identity,
        Some(existing),
        "failed sign-out must not drop the session client-side"
    );
    assert_eq!(snapshot.status, AsyncStatus::Failed);
    assert!(snapshot.error.is_some());
}

#[tokio::test]
async fn issuing_an_operation_clears_a_previous_error() {
    let mut auth = MockAuthProvider::new();
    auth.expect_sign_in()
        .times(1)
        .return_once(|_| Err(AuthProviderError::credentials("invalid login credentials")));
    let returned = identity();
    auth.expect_sign_in()
        .times(1)
        .return_once(move |_| Ok(returned));

    let store = SessionStore::new(Arc::new(auth));
    let _ = store.sign_in(&credentials()).await;
    assert!(store.error().is_some());

    store.sign_in(&credentials()).await.expect("retry succeeds");
    assert!(store.error().is_none());
}

#[test]
fn set_identity_always_lands_on_succeeded() {
    let store = SessionStore::new(Arc::new(MockAuthProvider::new()));
    assert_eq!(store.status(), AsyncStatus::Idle);

    let resumed = identity();
    store.set_identity(Some(resumed.clone()));
    assert_eq!(store.identity(), Some(resumed));
    assert_eq!(store.status(), AsyncStatus::Succeeded);

    store.set_identity(None);
    assert!(store.identity().is_none());
    assert_eq!(store.status(), AsyncStatus::Succeeded);
}

#[test]
fn clear_error_touches_nothing_else() {
    let store = SessionStore::new(Arc::new(MockAuthProvider::new()));
    let existing = identity();
    store.set_identity(Some(existing.clone()));

    store.clear_error();
    assert_eq!(store.identity(), Some(existing));
    assert_eq!(store.status(), AsyncStatus::Succeeded);
    assert!(store.error().is_none());
}
