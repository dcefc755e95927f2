use std::sync::Arc;

use super::*;
use crate::notify::{MemorySink, Severity};
use crate::storage::Store;

fn service(root: &std::path::Path) -> (AuthService, MemorySink) {
    let sink = MemorySink::new();
    let store = Store::open_shared(root).unwrap();
    let svc = AuthService::open(store, Arc::new(sink.clone())).unwrap();
    (svc, sink)
}

#[tokio::test]
async fn validation_rejects_before_any_mutation() {
    let tmp = tempfile::tempdir().unwrap();
    let (svc, sink) = service(tmp.path());

    for (name, email, secret) in [
        ("", "a@x.com", "abcdef"),
        ("Ana", "", "abcdef"),
        ("Ana", "not-an-email", "abcdef"),
        ("Ana", "a@x.com", ""),
        ("Ana", "a@x.com", "12345"),
    ] {
        let err = svc.register(name, email, secret, AccountKind::Creator).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)), "{name}/{email}/{secret}");
    }
    assert!(svc.registry.is_empty());
    assert!(!tmp.path().join("accounts.json").exists());
    assert!(!tmp.path().join("credentials.json").exists());
    assert!(!tmp.path().join("session.json").exists());
    // one error notification per rejected attempt
    assert_eq!(sink.take().len(), 5);
}

#[tokio::test]
async fn register_authenticates_and_persists_everything() {
    let tmp = tempfile::tempdir().unwrap();
    let (svc, sink) = service(tmp.path());

    let account = svc
        .register("Ana", "ana@x.com", "abcdef", AccountKind::Creator)
        .await
        .unwrap();
    assert_eq!(account.kind, AccountKind::Creator);
    assert_eq!(account.bio.as_deref(), Some("Criador de produtos digitais"));
    assert!(account.avatar_url.as_deref().unwrap().contains("seed=Ana"));
    assert!(account.last_login.is_none());

    assert_eq!(svc.current().unwrap().id, account.id);
    assert_eq!(svc.sessions.current(), Some(account.id.clone()));
    assert!(svc.vault.verify(&account.id, "abcdef"));

    let last = sink.last().unwrap();
    assert_eq!(last.severity, Severity::Info);
    assert!(last.message.contains("Bem-vindo, Ana"));
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let tmp = tempfile::tempdir().unwrap();
    let (svc, _sink) = service(tmp.path());

    svc.register("Bob", "bob@x.com", "123456", AccountKind::Affiliate).await.unwrap();
    svc.logout().await;
    let err = svc
        .register("Bob2", "bob@x.com", "654321", AccountKind::Creator)
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::DuplicateEmail);
    assert_eq!(svc.registry.len(), 1);
    assert!(svc.current().is_none());
}

#[tokio::test]
async fn register_is_rejected_while_authenticated() {
    let tmp = tempfile::tempdir().unwrap();
    let (svc, _sink) = service(tmp.path());
    svc.register("Ana", "ana@x.com", "abcdef", AccountKind::Creator).await.unwrap();
    let err = svc
        .register("Eva", "eva@x.com", "abcdef", AccountKind::Affiliate)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));
    assert_eq!(svc.registry.len(), 1);
}

#[tokio::test]
async fn login_round_trip_and_failure_paths() {
    let tmp = tempfile::tempdir().unwrap();
    let (svc, sink) = service(tmp.path());

    let registered = svc
        .register("Bob", "bob@x.com", "123456", AccountKind::Affiliate)
        .await
        .unwrap();
    svc.logout().await;
    sink.take();

    let err = svc.login("nobody@x.com", "123456").await.unwrap_err();
    assert_eq!(err, AuthError::AccountNotFound);
    assert!(svc.current().is_none());

    let err = svc.login("bob@x.com", "000000").await.unwrap_err();
    assert_eq!(err, AuthError::InvalidCredential);
    assert!(svc.current().is_none());
    assert!(svc.sessions.current().is_none());

    let logged = svc.login("bob@x.com", "123456").await.unwrap();
    assert_eq!(logged.id, registered.id);
    assert!(logged.last_login.is_some());
    assert_eq!(sink.last().unwrap().message, "Bem-vindo de volta, Bob!");
}

#[tokio::test]
async fn failed_login_keeps_existing_session() {
    let tmp = tempfile::tempdir().unwrap();
    let (svc, _sink) = service(tmp.path());
    let ana = svc.register("Ana", "ana@x.com", "abcdef", AccountKind::Creator).await.unwrap();

    let err = svc.login("ana@x.com", "wrong!").await.unwrap_err();
    assert_eq!(err, AuthError::InvalidCredential);
    assert_eq!(svc.current().unwrap().id, ana.id);
    assert_eq!(svc.sessions.current(), Some(ana.id));
}

#[tokio::test]
async fn logout_is_a_noop_when_anonymous() {
    let tmp = tempfile::tempdir().unwrap();
    let (svc, sink) = service(tmp.path());
    svc.logout().await;
    assert!(sink.is_empty());
    assert!(svc.current().is_none());
}

#[tokio::test]
async fn update_profile_preserves_identity_fields() {
    let tmp = tempfile::tempdir().unwrap();
    let (svc, _sink) = service(tmp.path());
    let ana = svc.register("Ana", "ana@x.com", "abcdef", AccountKind::Creator).await.unwrap();

    let patch = ProfilePatch {
        name: Some("Ana Maria".into()),
        bio: Some("Nova bio".into()),
        avatar_url: None,
    };
    let updated = svc.update_profile(patch).await.unwrap();
    assert_eq!(updated.id, ana.id);
    assert_eq!(updated.email, ana.email);
    assert_eq!(updated.kind, ana.kind);
    assert_eq!(updated.created_at, ana.created_at);
    assert_eq!(updated.name, "Ana Maria");
    assert_eq!(updated.bio.as_deref(), Some("Nova bio"));
    assert_eq!(updated.avatar_url, ana.avatar_url);

    // registry holds the same record
    let stored = svc.registry.find_by_id(&ana.id).unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn update_profile_while_anonymous_mutates_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let (svc, sink) = service(tmp.path());
    let err = svc
        .update_profile(ProfilePatch { name: Some("X".into()), ..Default::default() })
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::AccountNotFound);
    // silent: no notification for the anonymous no-op
    assert!(sink.is_empty());
}

#[tokio::test]
async fn update_profile_rejects_empty_name() {
    let tmp = tempfile::tempdir().unwrap();
    let (svc, _sink) = service(tmp.path());
    let ana = svc.register("Ana", "ana@x.com", "abcdef", AccountKind::Creator).await.unwrap();
    let err = svc
        .update_profile(ProfilePatch { name: Some("   ".into()), ..Default::default() })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Validation(_)));
    assert_eq!(svc.registry.find_by_id(&ana.id).unwrap().name, "Ana");
}

#[tokio::test]
async fn concurrent_operation_is_rejected_with_busy() {
    let tmp = tempfile::tempdir().unwrap();
    let (svc, sink) = service(tmp.path());

    // hold the operation gate as an in-flight register/login would
    let _guard = svc.op.try_lock().unwrap();
    let err = svc
        .register("Ana", "ana@x.com", "abcdef", AccountKind::Creator)
        .await
        .unwrap_err();
    assert_eq!(err, AuthError::Busy);
    let err = svc.login("ana@x.com", "abcdef").await.unwrap_err();
    assert_eq!(err, AuthError::Busy);
    let err = svc.update_profile(ProfilePatch::default()).await.unwrap_err();
    assert_eq!(err, AuthError::Busy);

    let notes = sink.take();
    assert_eq!(notes.len(), 3);
    assert!(notes.iter().all(|n| n.severity == Severity::Error));
}

#[tokio::test]
async fn empty_patch_is_a_noop() {
    let tmp = tempfile::tempdir().unwrap();
    let (svc, sink) = service(tmp.path());
    let ana = svc.register("Ana", "ana@x.com", "abcdef", AccountKind::Creator).await.unwrap();
    sink.take();

    let unchanged = svc.update_profile(ProfilePatch::default()).await.unwrap();
    assert_eq!(unchanged, ana);
    assert_eq!(svc.registry.find_by_id(&ana.id).unwrap(), ana);
    // no mutation happened, so nothing to announce
    assert!(sink.is_empty());
}

#[tokio::test]
async fn snapshot_shows_loading_then_authenticated() {
    let tmp = tempfile::tempdir().unwrap();
    let (svc, _sink) = service(tmp.path());
    let rx = svc.subscribe();

    // drive the state plumbing directly so the in-flight snapshot is
    // observable; the watch channel only ever holds the latest value
    svc.begin();
    {
        let snap = rx.borrow();
        assert!(snap.is_loading);
        assert!(snap.current.is_none());
    }

    let ana = Account::new("Ana", "ana@x.com", AccountKind::Creator);
    svc.settle(AuthState::Authenticated(ana.clone()));
    let snap = rx.borrow().clone();
    assert!(!snap.is_loading);
    assert_eq!(snap.current.unwrap().id, ana.id);
}

#[tokio::test]
async fn snapshots_track_loading_and_authentication() {
    let tmp = tempfile::tempdir().unwrap();
    let (svc, _sink) = service(tmp.path());
    let mut rx = svc.subscribe();
    assert!(rx.borrow().current.is_none());
    assert!(!rx.borrow().is_loading);

    svc.register("Ana", "ana@x.com", "abcdef", AccountKind::Creator).await.unwrap();
    // latest snapshot: authenticated, not loading
    assert!(rx.has_changed().unwrap());
    let snap = rx.borrow_and_update().clone();
    assert!(!snap.is_loading);
    assert_eq!(snap.current.unwrap().email, "ana@x.com");

    svc.logout().await;
    let snap = rx.borrow_and_update().clone();
    assert!(snap.current.is_none());
}
