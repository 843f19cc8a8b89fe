//! Notification repository.

use qd_core::entities::Notification;
use qd_core::enums::Collection;
use qd_core::inputs::NewNotification;
use qd_store::timestamp::server_timestamp;
use qd_store::{Document, Fields, to_fields};
use serde_json::json;
use tracing::debug;

use crate::error::MutationError;
use crate::service::HelpdeskService;

impl HelpdeskService {
    /// Create an unread notification. Returns its id.
    pub async fn create_notification(&self, notification: NewNotification) -> Result<String, MutationError> {
        if notification.user_id.trim().is_empty() {
            return Err(MutationError::Validation("a recipient is required".into()));
        }
        let mut fields = to_fields(&notification)?;
        fields.insert("read".into(), json!(false));
        fields.insert("createdAt".into(), server_timestamp());
        let id = self
            .store()
            .add_document(Collection::Notifications, fields)
            .await?;
        debug!(notification = %id, recipient = %notification.user_id, kind = %notification.kind, "notification created");
        Ok(id)
    }

    /// Flip `read` on one of the signed-in user's notifications.
    pub async fn mark_notification_as_read(&self, id: &str) -> Result<(), MutationError> {
        let user = self.require_user()?;
        let (_, notification): (Document, Notification) =
            self.fetch(Collection::Notifications, id).await?;
        if notification.user_id != user.uid {
            return Err(MutationError::PermissionDenied {
                action: "mark_notification_as_read",
                required: "the notification's recipient",
                role: user.role,
            });
        }

        let mut fields = Fields::new();
        fields.insert("read".into(), json!(true));
        self.store()
            .update_document(Collection::Notifications, id, fields)
            .await?;
        Ok(())
    }
}
