mod common;

use std::sync::Arc;

use brutalmotors::auth::{AuthContext, AuthState};
use brutalmotors::gateway::PersistenceGateway;
use brutalmotors::session::{FileSessionStore, SessionStore};

fn temp_dir() -> std::path::PathBuf {
    std::env::temp_dir().join(format!("brutalmotors-test-{}", uuid::Uuid::new_v4()))
}

#[tokio::test]
async fn session_survives_a_restart() {
    let h = common::harness();
    h.auth.bootstrap().await;
    common::sign_in_user(&h).await;

    // A fresh context over the same stores is "the next run".
    let next = AuthContext::new(h.gateway.clone(), Arc::new(h.sessions.clone()));
    next.bootstrap().await;

    let identity = next.identity().unwrap();
    assert_eq!(identity.name, "John Doe");
    assert_eq!(identity.email, common::USER_EMAIL);
}

#[tokio::test]
async fn resumed_session_picks_up_role_changes() {
    let h = common::harness();
    h.auth.bootstrap().await;
    common::sign_in_user(&h).await;
    let user_id = h.auth.identity().unwrap().id;

    // Promotion lands between runs.
    h.gateway.set_administrator(&user_id, true).await.unwrap();

    let next = AuthContext::new(h.gateway.clone(), Arc::new(h.sessions.clone()));
    next.bootstrap().await;

    assert!(next.identity().unwrap().is_administrator);
}

#[tokio::test]
async fn corrupt_session_record_means_signed_out() {
    let h = common::harness();
    h.sessions.seed_raw("{ not json at all");

    h.auth.bootstrap().await;

    assert_eq!(h.auth.state(), AuthState::Anonymous);
}

#[tokio::test]
async fn revalidation_fault_starts_signed_out_but_keeps_the_record() {
    let h = common::harness();
    h.auth.bootstrap().await;
    common::sign_in_user(&h).await;

    h.gateway.set_offline(true);
    let next = AuthContext::new(h.gateway.clone(), Arc::new(h.sessions.clone()));
    next.bootstrap().await;

    assert_eq!(next.state(), AuthState::Anonymous);
    // The record stays for a retry once the backend is reachable again.
    assert!(h.sessions.read().unwrap().is_some());
}

#[test]
fn file_store_round_trips_the_identity() {
    let dir = temp_dir();
    let store = FileSessionStore::new(&dir).unwrap();

    assert!(store.read().unwrap().is_none());

    let identity = brutalmotors::models::Identity {
        id: "42".into(),
        name: "Jane Roe".into(),
        email: "jane@example.com".into(),
        phone: "+15550002222".into(),
        is_administrator: false,
    };
    store.write(&identity).unwrap();
    assert_eq!(store.read().unwrap(), Some(identity));

    store.clear().unwrap();
    assert!(store.read().unwrap().is_none());
    // Clearing an already-empty store is fine.
    store.clear().unwrap();

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn file_store_tolerates_garbage_on_disk() {
    let dir = temp_dir();
    let store = FileSessionStore::new(&dir).unwrap();

    std::fs::write(store.path(), "not json").unwrap();
    assert!(store.read().unwrap().is_none());

    let _ = std::fs::remove_dir_all(&dir);
}
