//! Profile lookup keyed by identity uid.

use chrono::Utc;
use qd_core::entities::UserProfile;
use qd_core::enums::Collection;
use qd_core::identity::{AuthIdentity, SessionUser};
use qd_store::{DocumentStore, TimestampFields};
use tracing::warn;

use crate::error::AuthError;

/// Read and decode `users/{uid}`.
///
/// # Errors
///
/// Returns `AuthError::ProfileLookup` if the document is missing, unreadable
/// or malformed.
pub async fn fetch_profile(store: &dyn DocumentStore, uid: &str) -> Result<UserProfile, AuthError> {
    let lookup_error = |reason: String| AuthError::ProfileLookup {
        uid: uid.to_string(),
        reason,
    };

    let doc = store
        .get_document(Collection::Users, uid)
        .await
        .map_err(|e| lookup_error(e.to_string()))?
        .ok_or_else(|| lookup_error("no profile document".into()))?;

    doc.decode(
        Collection::Users,
        &TimestampFields::for_collection(Collection::Users),
        Utc::now(),
    )
    .map_err(|e| lookup_error(e.to_string()))
}

/// Build the session user for `identity`. A failed profile lookup is logged
/// and yields the default role.
pub async fn resolve_session_user(store: &dyn DocumentStore, identity: &AuthIdentity) -> SessionUser {
    match fetch_profile(store, &identity.uid).await {
        Ok(profile) => SessionUser::from_profile(identity, profile),
        Err(error) => {
            warn!(%error, uid = %identity.uid, "profile lookup failed, defaulting to end_user");
            SessionUser::without_profile(identity)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qd_core::enums::Role;
    use qd_store::MemoryStore;
    use qd_store::timestamp::server_timestamp;
    use serde_json::json;

    fn identity() -> AuthIdentity {
        AuthIdentity {
            uid: "u1".into(),
            email: "jane@example.com".into(),
            display_name: None,
        }
    }

    #[tokio::test]
    async fn profile_role_is_used() {
        let store = MemoryStore::new();
        store
            .set_document(
                Collection::Users,
                "u1",
                json!({
                    "name": "Jane",
                    "email": "jane@example.com",
                    "role": "support_agent",
                    "createdAt": server_timestamp(),
                    "updatedAt": server_timestamp()
                })
                .as_object()
                .cloned()
                .unwrap(),
            )
            .await
            .unwrap();

        let user = resolve_session_user(&store, &identity()).await;
        assert_eq!(user.role, Role::SupportAgent);
        assert_eq!(user.name, "Jane");
    }

    #[tokio::test]
    async fn missing_profile_falls_back_to_end_user() {
        let store = MemoryStore::new();
        assert!(matches!(
            fetch_profile(&store, "u1").await,
            Err(AuthError::ProfileLookup { .. })
        ));
        let user = resolve_session_user(&store, &identity()).await;
        assert_eq!(user.role, Role::EndUser);
        assert_eq!(user.name, "jane");
    }

    #[tokio::test]
    async fn malformed_profile_falls_back_to_end_user() {
        let store = MemoryStore::new();
        store
            .set_document(
                Collection::Users,
                "u1",
                json!({ "role": "superuser" }).as_object().cloned().unwrap(),
            )
            .await
            .unwrap();
        let user = resolve_session_user(&store, &identity()).await;
        assert_eq!(user.role, Role::EndUser);
    }
}
