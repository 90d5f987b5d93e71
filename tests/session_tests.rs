//! Session store tests with an in-memory backend

mod common;

use common::mocks::MockBackend;
use std::sync::Arc;
use tena::auth::SessionStore;
use tena::navigation::{Navigator, Page};
use tena::types::AuthStatus;

#[tokio::test]
async fn test_state_is_loading_until_status_check() {
    let backend = Arc::new(MockBackend::new());
    let session = SessionStore::new(backend.clone());

    assert!(session.snapshot().is_loading);
    session.check_status().await;

    let state = session.snapshot();
    assert!(!state.is_loading);
    assert!(!state.is_authenticated);
    assert_eq!(backend.calls("status"), 1);
}

#[tokio::test]
async fn test_status_check_restores_cookie_session() {
    let backend = Arc::new(
        MockBackend::new()
            .with_account("root@example.com", "Adm1nPass", true)
            .signed_in_as("root@example.com"),
    );
    let session = SessionStore::new(backend);
    session.check_status().await;

    let state = session.snapshot();
    assert!(state.is_authenticated);
    assert!(state.is_admin);
    assert_eq!(state.user.unwrap().email, "root@example.com");
}

#[tokio::test]
async fn test_authenticated_status_without_email_still_has_user() {
    let backend = Arc::new(MockBackend::new().with_status(AuthStatus {
        is_authenticated: true,
        email: None,
        user_id: Some("42".to_string()),
        is_admin: false,
    }));
    let session = SessionStore::new(backend);
    session.check_status().await;

    let state = session.snapshot();
    assert!(state.is_authenticated);
    let user = state.user.expect("authenticated state carries a user");
    assert_eq!(user.email, "");
    assert_eq!(user.user_id.as_deref(), Some("42"));
}

#[tokio::test]
async fn test_failing_status_check_counts_as_signed_out() {
    let backend = Arc::new(MockBackend::new().failing_status());
    let session = SessionStore::new(backend);
    session.check_status().await;

    let state = session.snapshot();
    assert!(!state.is_loading);
    assert!(!state.is_authenticated);
    assert!(state.user.is_none());
}

#[tokio::test]
async fn test_login_fills_user_id_and_admin_from_status() {
    let backend = Arc::new(MockBackend::new().with_account("root@example.com", "Adm1nPass", true));
    let session = SessionStore::new(backend.clone());

    let user = session.login("root@example.com", "Adm1nPass").await.unwrap();
    assert_eq!(user.email, "root@example.com");
    assert_eq!(user.user_id.as_deref(), Some("1"));

    let state = session.snapshot();
    assert!(state.is_authenticated);
    assert!(state.is_admin);
    assert!(!state.is_guest);
    assert_eq!(backend.calls("status"), 1);
}

#[tokio::test]
async fn test_bad_credentials_leave_state_untouched() {
    let backend = Arc::new(MockBackend::new().with_account("amara@example.com", "secret1", false));
    let session = SessionStore::new(backend);
    session.check_status().await;

    let err = session
        .login("amara@example.com", "not-it")
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_guest_then_login_drops_guest_flag() {
    let backend = Arc::new(MockBackend::new().with_account("amara@example.com", "secret1", false));
    let session = SessionStore::new(backend);

    session.continue_as_guest();
    let state = session.snapshot();
    assert!(state.is_guest);
    assert!(!state.is_loading);

    session.login("amara@example.com", "secret1").await.unwrap();
    let state = session.snapshot();
    assert!(state.is_authenticated);
    assert!(!state.is_guest);
}

#[tokio::test]
async fn test_register_does_not_sign_in() {
    let backend = Arc::new(MockBackend::new());
    let session = SessionStore::new(backend.clone());

    let message = session
        .register("amara@example.com", "Str0ngPass", "Amara")
        .await
        .unwrap();
    assert_eq!(message, "User registered successfully");
    assert!(!session.is_authenticated());
    assert_eq!(backend.account_count(), 1);

    let err = session
        .register("amara@example.com", "Str0ngPass", "Amara")
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_logout_clears_state_even_when_backend_fails() {
    let backend = Arc::new(
        MockBackend::new()
            .with_account("amara@example.com", "secret1", false)
            .failing_logout(),
    );
    let session = SessionStore::new(backend.clone());
    session.login("amara@example.com", "secret1").await.unwrap();

    session.logout().await;

    let state = session.snapshot();
    assert!(!state.is_authenticated);
    assert!(!state.is_guest);
    assert!(state.user.is_none());
    assert_eq!(backend.calls("logout"), 1);
}

#[tokio::test]
async fn test_guest_logout_makes_no_request() {
    let backend = Arc::new(MockBackend::new());
    let session = SessionStore::new(backend.clone());
    session.continue_as_guest();

    session.logout().await;

    assert!(!session.snapshot().is_guest);
    assert_eq!(backend.calls("logout"), 0);
}

#[tokio::test]
async fn test_reset_password_with_token() {
    let backend = Arc::new(
        MockBackend::new()
            .with_account("amara@example.com", "secret1", false)
            .with_reset_token("tok-1"),
    );
    let session = SessionStore::new(backend.clone());

    assert!(session.reset_password("bogus", "N3wPassword").await.is_err());
    session.reset_password("tok-1", "N3wPassword").await.unwrap();
    assert_eq!(
        backend.password_of("amara@example.com").as_deref(),
        Some("N3wPassword")
    );
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_guard_follows_session_changes() {
    let backend = Arc::new(MockBackend::new().with_account("amara@example.com", "secret1", false));
    let session = SessionStore::new(backend);
    let mut nav = Navigator::new(Page::Chat);

    // Still loading: stays put
    assert_eq!(nav.apply_guard(&session.snapshot()), None);

    session.check_status().await;
    assert_eq!(nav.apply_guard(&session.snapshot()), Some(Page::Landing));

    nav.navigate(Page::SignIn);
    session.login("amara@example.com", "secret1").await.unwrap();
    assert_eq!(nav.apply_guard(&session.snapshot()), Some(Page::Chat));

    nav.navigate(Page::Admin);
    assert_eq!(nav.apply_guard(&session.snapshot()), Some(Page::Chat));

    session.logout().await;
    assert_eq!(nav.apply_guard(&session.snapshot()), Some(Page::Landing));
}
