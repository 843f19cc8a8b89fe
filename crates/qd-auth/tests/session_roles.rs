//! Session roles come from the profile document, not from the provider.

use std::sync::Arc;

use qd_auth::{AuthProvider, DEMO_ACCOUNTS, DEMO_PASSWORD, MemoryAuthProvider, SessionStore};
use qd_core::enums::{Collection, Role};
use qd_store::timestamp::server_timestamp;
use qd_store::{DocumentStore, Fields, MemoryStore};
use serde_json::json;

async fn write_profile(store: &MemoryStore, uid: &str, name: &str, email: &str, role: Role) {
    let fields: Fields = json!({
        "name": name,
        "email": email,
        "role": role,
        "createdAt": server_timestamp(),
        "updatedAt": server_timestamp()
    })
    .as_object()
    .cloned()
    .unwrap();
    store
        .set_document(Collection::Users, uid, fields)
        .await
        .unwrap();
}

async fn seeded() -> (Arc<MemoryStore>, Arc<SessionStore>) {
    let store = Arc::new(MemoryStore::new());
    for demo in DEMO_ACCOUNTS {
        write_profile(&store, demo.uid, demo.name, demo.email, demo.role).await;
    }
    let provider: Arc<dyn AuthProvider> = Arc::new(MemoryAuthProvider::with_demo_accounts().unwrap());
    let session = SessionStore::start(provider, store.clone(), None);
    session.ready().await;
    (store, session)
}

#[tokio::test]
async fn each_demo_account_gets_its_profile_role() {
    let (_store, session) = seeded().await;
    for demo in DEMO_ACCOUNTS {
        let user = session.login(demo.email, DEMO_PASSWORD).await.unwrap();
        assert_eq!(user.uid, demo.uid);
        assert_eq!(user.role, demo.role);
        session.logout().await.unwrap();
        assert!(session.current_user().is_none());
    }
}

#[tokio::test]
async fn refresh_picks_up_role_change() {
    let (store, session) = seeded().await;
    session
        .login("user@example.com", DEMO_PASSWORD)
        .await
        .unwrap();
    assert_eq!(session.current_user().unwrap().role, Role::EndUser);

    let mut update = Fields::new();
    update.insert("role".into(), json!("support_agent"));
    store
        .update_document(Collection::Users, "1", update)
        .await
        .unwrap();

    let refreshed = session.refresh_profile().await.unwrap();
    assert_eq!(refreshed.role, Role::SupportAgent);
    assert_eq!(session.current_user().unwrap().role, Role::SupportAgent);
}

#[tokio::test]
async fn subscriber_sees_resolved_login() {
    let (_store, session) = seeded().await;
    let mut rx = session.subscribe();
    rx.borrow_and_update();

    session
        .login("agent@example.com", DEMO_PASSWORD)
        .await
        .unwrap();

    let state = rx.borrow_and_update().clone();
    assert!(!state.loading);
    assert_eq!(state.user.unwrap().role, Role::SupportAgent);
}
