//! Creation payloads.
//!
//! These carry only the caller-supplied fields. Ids, timestamps, empty reply
//! threads and zeroed vote counters are filled in by the mutation layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{NotificationKind, Priority, Role, TicketStatus};
use crate::errors::CoreError;

pub const MIN_TITLE_LEN: usize = 5;
pub const MIN_DESCRIPTION_LEN: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Priority,
    pub status: TicketStatus,
    pub created_by: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

impl NewTicket {
    /// Open, unassigned ticket with the given fields.
    #[must_use]
    pub fn open(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        priority: Priority,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: category.into(),
            priority,
            status: TicketStatus::Open,
            created_by: created_by.into(),
            assigned_to: None,
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the title is shorter than 5
    /// characters, the description shorter than 20, or no category is set.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.title.chars().count() < MIN_TITLE_LEN {
            return Err(CoreError::Validation(format!(
                "title must be at least {MIN_TITLE_LEN} characters long"
            )));
        }
        if self.description.chars().count() < MIN_DESCRIPTION_LEN {
            return Err(CoreError::Validation(format!(
                "description must be at least {MIN_DESCRIPTION_LEN} characters long"
            )));
        }
        if self.category.trim().is_empty() {
            return Err(CoreError::Validation("a category is required".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewCategory {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the name is blank.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_category_name(&self.name)
    }
}

/// # Errors
///
/// Returns `CoreError::Validation` if `name` is empty after trimming.
pub fn validate_category_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("category name is required".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub user_id: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(default)]
    pub ticket_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewRoleUpgradeRequest {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub current_role: Role,
    pub requested_role: Role,
    #[serde(default)]
    pub message: Option<String>,
}

impl NewRoleUpgradeRequest {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the requested role is not above the
    /// current one.
    pub fn validate(&self) -> Result<(), CoreError> {
        if rank(self.requested_role) <= rank(self.current_role) {
            return Err(CoreError::Validation(format!(
                "cannot request {} while holding {}",
                self.requested_role, self.current_role
            )));
        }
        Ok(())
    }
}

const fn rank(role: Role) -> u8 {
    match role {
        Role::EndUser => 0,
        Role::SupportAgent => 1,
        Role::Admin => 2,
    }
}
