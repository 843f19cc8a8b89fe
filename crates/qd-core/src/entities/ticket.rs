use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Priority, TicketStatus};

/// A support ticket.
///
/// `votes` is kept alongside `voted_by` on the wire; the two are expected to
/// agree (`votes == voted_by.len()`), but nothing in the store enforces it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    /// Category *name*. Not a foreign key.
    pub category: String,
    #[serde(default)]
    pub priority: Priority,
    pub created_by: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub replies: Vec<Reply>,
    #[serde(default)]
    pub votes: u32,
    #[serde(default)]
    pub voted_by: Vec<String>,
}

/// One entry of a ticket's append-only reply thread.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: String,
    pub message: String,
    pub author_id: String,
    /// Author's display name at the time of posting.
    pub author_name: String,
    pub timestamp: DateTime<Utc>,
}

/// Result of toggling one user's vote on a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteToggle {
    pub votes: u32,
    pub voted_by: Vec<String>,
    /// `true` if the vote was added, `false` if it was withdrawn.
    pub added: bool,
}

impl Ticket {
    #[must_use]
    pub fn has_voted(&self, user_id: &str) -> bool {
        self.voted_by.iter().any(|id| id == user_id)
    }

    /// Compute the vote fields after toggling `user_id`'s membership.
    ///
    /// The counter moves by exactly one in the same direction as the set, so
    /// a ticket whose counter already disagrees with its set stays off by the
    /// same amount.
    #[must_use]
    pub fn toggled_vote(&self, user_id: &str) -> VoteToggle {
        if self.has_voted(user_id) {
            VoteToggle {
                votes: self.votes.saturating_sub(1),
                voted_by: self
                    .voted_by
                    .iter()
                    .filter(|id| id.as_str() != user_id)
                    .cloned()
                    .collect(),
                added: false,
            }
        } else {
            let mut voted_by = self.voted_by.clone();
            voted_by.push(user_id.to_string());
            VoteToggle {
                votes: self.votes.saturating_add(1),
                voted_by,
                added: true,
            }
        }
    }

    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.assigned_to.is_some()
    }

    #[must_use]
    pub fn latest_reply(&self) -> Option<&Reply> {
        self.replies.last()
    }
}
