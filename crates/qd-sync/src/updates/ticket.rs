//! Ticket update builder.

use qd_core::enums::{Priority, TicketStatus};
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Option<String>>,
}

impl TicketUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.assigned_to.is_none()
    }
}

pub struct TicketUpdateBuilder(TicketUpdate);

impl TicketUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(TicketUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.0.description = Some(description.into());
        self
    }

    #[must_use]
    pub const fn status(mut self, status: TicketStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.0.category = Some(category.into());
        self
    }

    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.0.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn assigned_to(mut self, assignee: Option<String>) -> Self {
        self.0.assigned_to = Some(assignee);
        self
    }

    #[must_use]
    pub fn build(self) -> TicketUpdate {
        self.0
    }
}

impl Default for TicketUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
