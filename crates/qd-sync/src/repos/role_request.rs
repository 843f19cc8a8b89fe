//! Role-upgrade request repository.

use chrono::Utc;
use qd_core::entities::RoleUpgradeRequest;
use qd_core::enums::{Collection, NotificationKind, RequestStatus, Role};
use qd_core::inputs::{NewNotification, NewRoleUpgradeRequest};
use qd_store::timestamp::server_timestamp;
use qd_store::{Document, Fields, to_fields};
use serde_json::json;
use tracing::info;

use crate::error::MutationError;
use crate::mapping::decode_all;
use crate::service::HelpdeskService;

impl HelpdeskService {
    /// File a pending request on behalf of the signed-in user and notify
    /// every admin. Returns the request id.
    ///
    /// A user may have only one pending request at a time.
    pub async fn create_role_upgrade_request(
        &self,
        request: NewRoleUpgradeRequest,
    ) -> Result<String, MutationError> {
        let user = self.require_user()?;
        if request.user_id != user.uid {
            return Err(MutationError::Validation(
                "role upgrades can only be requested for yourself".into(),
            ));
        }
        request.validate()?;

        let docs = self
            .store()
            .list_documents(Collection::RoleUpgradeRequests)
            .await?;
        let existing: Vec<RoleUpgradeRequest> =
            decode_all(Collection::RoleUpgradeRequests, &docs, Utc::now());
        if existing
            .iter()
            .any(|r| r.user_id == user.uid && r.is_pending())
        {
            return Err(MutationError::Validation(
                "a role upgrade request is already pending".into(),
            ));
        }

        let mut fields = to_fields(&request)?;
        fields.insert("status".into(), json!(RequestStatus::Pending));
        fields.insert("createdAt".into(), server_timestamp());
        let id = self
            .store()
            .add_document(Collection::RoleUpgradeRequests, fields)
            .await?;
        info!(request = %id, user = %user.uid, requested = %request.requested_role, "role upgrade requested");

        self.notify_roles(&[Role::Admin], None, |admin| NewNotification {
            user_id: admin.id.clone(),
            title: "New role upgrade request".into(),
            message: format!(
                "{} has requested to be upgraded from {} to {}",
                request.user_name,
                role_label(request.current_role),
                role_label(request.requested_role)
            ),
            kind: NotificationKind::RoleUpgradeRequest,
            ticket_id: None,
        })
        .await;

        Ok(id)
    }

    /// Approve or reject a pending request. Admin only. Approval also sets
    /// the requester's role; if that fails the request stays pending.
    pub async fn process_role_upgrade_request(
        &self,
        id: &str,
        approve: bool,
    ) -> Result<(), MutationError> {
        let admin = self.require_admin("process_role_upgrade_request")?;
        let (_, request): (Document, RoleUpgradeRequest) =
            self.fetch(Collection::RoleUpgradeRequests, id).await?;

        let status = if approve {
            RequestStatus::Approved
        } else {
            RequestStatus::Rejected
        };
        if !request.status.can_transition_to(status) {
            return Err(MutationError::Validation(format!(
                "request {id} is already {}",
                request.status
            )));
        }

        // Role first: a failed role write leaves the request pending.
        if approve {
            self.update_user_role(&request.user_id, request.requested_role)
                .await?;
        }

        let mut fields = Fields::new();
        fields.insert("status".into(), json!(status));
        fields.insert("processedAt".into(), server_timestamp());
        fields.insert("processedBy".into(), json!(admin.uid));
        self.store()
            .update_document(Collection::RoleUpgradeRequests, id, fields)
            .await?;
        info!(request = %id, %status, by = %admin.uid, "role upgrade request processed");
        Ok(())
    }
}

const fn role_label(role: Role) -> &'static str {
    match role {
        Role::EndUser => "End User",
        Role::SupportAgent => "Support Agent",
        Role::Admin => "Admin",
    }
}
