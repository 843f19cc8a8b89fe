//! Client-side filters applied by the view layer to synchronized lists.
//!
//! These never talk to the store. They take whatever the synchronizer last
//! delivered and narrow it for display.

use std::collections::BTreeSet;

use crate::entities::{Notification, Ticket};
use crate::enums::{Role, TicketStatus};
use crate::identity::SessionUser;

/// Assignment constraint for the ticket list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AssignmentFilter {
    #[default]
    Any,
    Unassigned,
    AssignedTo(String),
}

impl AssignmentFilter {
    fn matches(&self, ticket: &Ticket) -> bool {
        match self {
            Self::Any => true,
            Self::Unassigned => ticket.assigned_to.is_none(),
            Self::AssignedTo(uid) => ticket.assigned_to.as_deref() == Some(uid.as_str()),
        }
    }
}

/// Dashboard ticket filter.
///
/// `search` matches title or description case-insensitively; `category`
/// compares names case-insensitively. `None` means "all".
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub search: String,
    pub status: Option<TicketStatus>,
    pub category: Option<String>,
    pub assignment: AssignmentFilter,
}

impl TicketFilter {
    #[must_use]
    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.search = query.into();
        self
    }

    #[must_use]
    pub const fn status(mut self, status: TicketStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn assignment(mut self, assignment: AssignmentFilter) -> Self {
        self.assignment = assignment;
        self
    }

    /// Whether `ticket` passes every criterion for `viewer`.
    ///
    /// End users only ever see tickets they created.
    #[must_use]
    pub fn matches(&self, ticket: &Ticket, viewer: Option<&SessionUser>) -> bool {
        if let Some(user) = viewer
            && user.role == Role::EndUser
            && ticket.created_by != user.uid
        {
            return false;
        }

        let query = self.search.to_lowercase();
        let matches_search = query.is_empty()
            || ticket.title.to_lowercase().contains(&query)
            || ticket.description.to_lowercase().contains(&query);
        let matches_status = self.status.is_none_or(|s| ticket.status == s);
        let matches_category = self
            .category
            .as_ref()
            .is_none_or(|c| ticket.category.to_lowercase() == c.to_lowercase());

        matches_search && matches_status && matches_category && self.assignment.matches(ticket)
    }

    #[must_use]
    pub fn apply<'a>(&self, tickets: &'a [Ticket], viewer: Option<&SessionUser>) -> Vec<&'a Ticket> {
        tickets
            .iter()
            .filter(|t| self.matches(t, viewer))
            .collect()
    }
}

/// Distinct category names referenced by tickets, sorted.
///
/// Includes names of categories that no longer exist.
#[must_use]
pub fn unique_categories(tickets: &[Ticket]) -> Vec<String> {
    tickets
        .iter()
        .map(|t| t.category.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Notifications of the kinds relevant to `role`.
#[must_use]
pub fn visible_notifications(notifications: &[Notification], role: Role) -> Vec<&Notification> {
    notifications
        .iter()
        .filter(|n| n.kind.visible_to(role))
        .collect()
}

#[must_use]
pub fn unread_count(notifications: &[&Notification]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}
