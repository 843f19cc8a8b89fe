//! User profile repository.

use qd_core::enums::{Collection, Role};
use qd_store::timestamp::server_timestamp;
use qd_store::{Fields, to_fields};
use serde_json::json;
use tracing::info;

use crate::error::MutationError;
use crate::service::HelpdeskService;
use crate::updates::profile::ProfileUpdate;

impl HelpdeskService {
    /// Change a user's role. Admin only.
    ///
    /// If the target is the signed-in user, the session is refreshed so the
    /// new role takes effect (and the synchronizer's gates follow it).
    pub async fn update_user_role(&self, uid: &str, role: Role) -> Result<(), MutationError> {
        let admin = self.require_admin("update_user_role")?;

        let mut fields = Fields::new();
        fields.insert("role".into(), json!(role));
        fields.insert("updatedAt".into(), server_timestamp());
        self.store()
            .update_document(Collection::Users, uid, fields)
            .await?;
        info!(user = %uid, %role, by = %admin.uid, "user role updated");

        if admin.uid == uid {
            self.session().refresh_profile().await;
        }
        Ok(())
    }

    /// Update profile fields. A user may edit their own profile; admins may
    /// edit anyone's. Never changes the role.
    pub async fn update_user_profile(&self, uid: &str, update: ProfileUpdate) -> Result<(), MutationError> {
        let actor = self.require_user()?;
        if actor.uid != uid && !actor.role.is_admin() {
            return Err(MutationError::PermissionDenied {
                action: "update_user_profile",
                required: "admin or the profile owner",
                role: actor.role,
            });
        }
        if let Some(name) = &update.name
            && name.trim().is_empty()
        {
            return Err(MutationError::Validation("name is required".into()));
        }

        let mut fields = to_fields(&update)?;
        fields.insert("updatedAt".into(), server_timestamp());
        self.store()
            .update_document(Collection::Users, uid, fields)
            .await?;
        info!(user = %uid, "profile updated");

        if actor.uid == uid {
            self.session().refresh_profile().await;
        }
        Ok(())
    }
}
