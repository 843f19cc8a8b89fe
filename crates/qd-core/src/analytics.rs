//! Admin panel analytics over the synchronized ticket list.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Category, Ticket};
use crate::enums::TicketStatus;

/// Ticket counts by status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TicketStats {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
}

impl TicketStats {
    #[must_use]
    pub fn from_tickets(tickets: &[Ticket]) -> Self {
        tickets.iter().fold(
            Self {
                total: tickets.len(),
                ..Self::default()
            },
            |mut stats, t| {
                match t.status {
                    TicketStatus::Open => stats.open += 1,
                    TicketStatus::InProgress => stats.in_progress += 1,
                    TicketStatus::Resolved => stats.resolved += 1,
                    TicketStatus::Closed => stats.closed += 1,
                }
                stats
            },
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Tickets per existing category, matched by exact name.
///
/// Tickets whose category was deleted are not counted anywhere here.
#[must_use]
pub fn category_counts(categories: &[Category], tickets: &[Ticket]) -> Vec<CategoryCount> {
    categories
        .iter()
        .map(|c| CategoryCount {
            name: c.name.clone(),
            count: tickets.iter().filter(|t| t.category == c.name).count(),
        })
        .collect()
}
