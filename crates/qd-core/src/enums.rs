//! Status enums, roles, priorities, notification kinds and collection names.
//!
//! All enums serialize with `snake_case` values, matching the strings stored
//! in the remote documents. `Collection` is the exception: its names are the
//! remote collection identifiers and are spelled the way the store spells them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// TicketStatus
// ---------------------------------------------------------------------------

/// Status of a support ticket.
///
/// ```text
/// open → in_progress → resolved → closed
/// ```
///
/// The chain above is the intended workflow only. Staff may set any status
/// through a ticket update, including skipping states or moving backward, so
/// nothing in the mutation path consults [`TicketStatus::can_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub const ALL: [Self; 4] = [Self::Open, Self::InProgress, Self::Resolved, Self::Closed];

    /// Next state along the intended workflow.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Open => &[Self::InProgress],
            Self::InProgress => &[Self::Resolved],
            Self::Resolved => &[Self::Closed],
            Self::Closed => &[],
        }
    }

    /// Advisory check for callers that want to warn about off-workflow moves.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Closed tickets no longer accept replies.
    #[must_use]
    pub const fn accepts_replies(self) -> bool {
        !matches!(self, Self::Closed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Access tier of a user.
///
/// A profile without a readable role is treated as [`Role::EndUser`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    EndUser,
    SupportAgent,
    Admin,
}

impl Role {
    /// Support agents and admins may change ticket status and assignment.
    #[must_use]
    pub const fn can_manage_tickets(self) -> bool {
        matches!(self, Self::SupportAgent | Self::Admin)
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EndUser => "end_user",
            Self::SupportAgent => "support_agent",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// NotificationKind
// ---------------------------------------------------------------------------

/// What a notification is about. Stored in the document's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    TicketReply,
    TicketStatusChange,
    TicketAssigned,
    NewTicket,
    RoleUpgradeRequest,
}

impl NotificationKind {
    /// Whether a user holding `role` gets this kind in their notification list.
    ///
    /// End users follow their own tickets; staff triage incoming work.
    #[must_use]
    pub const fn visible_to(self, role: Role) -> bool {
        match self {
            Self::TicketReply | Self::TicketStatusChange | Self::TicketAssigned => {
                matches!(role, Role::EndUser)
            }
            Self::NewTicket | Self::RoleUpgradeRequest => role.can_manage_tickets(),
        }
    }

    /// Kinds that always point at a ticket.
    #[must_use]
    pub const fn refers_to_ticket(self) -> bool {
        match self {
            Self::TicketReply | Self::TicketStatusChange | Self::TicketAssigned | Self::NewTicket => {
                true
            }
            Self::RoleUpgradeRequest => false,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TicketReply => "ticket_reply",
            Self::TicketStatusChange => "ticket_status_change",
            Self::TicketAssigned => "ticket_assigned",
            Self::NewTicket => "new_ticket",
            Self::RoleUpgradeRequest => "role_upgrade_request",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RequestStatus
// ---------------------------------------------------------------------------

/// Status of a role-upgrade request.
///
/// ```text
/// pending → approved
///         → rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Approved, Self::Rejected],
            Self::Approved | Self::Rejected => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Collection
// ---------------------------------------------------------------------------

/// The five remote collections the client mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Collection {
    #[serde(rename = "tickets")]
    Tickets,
    #[serde(rename = "categories")]
    Categories,
    #[serde(rename = "users")]
    Users,
    #[serde(rename = "notifications")]
    Notifications,
    #[serde(rename = "roleUpgradeRequests")]
    RoleUpgradeRequests,
}

impl Collection {
    pub const ALL: [Self; 5] = [
        Self::Tickets,
        Self::Categories,
        Self::Users,
        Self::Notifications,
        Self::RoleUpgradeRequests,
    ];

    /// Collections only an admin session subscribes to.
    #[must_use]
    pub const fn is_admin_only(self) -> bool {
        matches!(self, Self::Users | Self::RoleUpgradeRequests)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tickets => "tickets",
            Self::Categories => "categories",
            Self::Users => "users",
            Self::Notifications => "notifications",
            Self::RoleUpgradeRequests => "roleUpgradeRequests",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
