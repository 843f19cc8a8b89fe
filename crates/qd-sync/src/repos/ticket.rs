//! Ticket repository: create, partial update, assignment, replies, votes.

use chrono::Utc;
use qd_core::entities::{Reply, Ticket, VoteToggle};
use qd_core::enums::{Collection, NotificationKind, Role};
use qd_core::identity::SessionUser;
use qd_core::inputs::{NewNotification, NewTicket};
use qd_store::ids::generate_id;
use qd_store::timestamp::{server_timestamp, timestamp_value};
use qd_store::{Document, Fields, to_fields};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::MutationError;
use crate::service::HelpdeskService;
use crate::updates::ticket::{TicketUpdate, TicketUpdateBuilder};

impl HelpdeskService {
    /// Create an open ticket with an empty thread and no votes. Staff are
    /// notified. Returns the new ticket's id.
    ///
    /// `created_by` must be the signed-in user.
    pub async fn create_ticket(&self, ticket: NewTicket) -> Result<String, MutationError> {
        let author = self.require_user()?;
        if ticket.created_by != author.uid {
            return Err(MutationError::Validation(
                "tickets can only be filed as yourself".into(),
            ));
        }
        ticket.validate()?;

        let mut fields = to_fields(&ticket)?;
        fields.insert("createdAt".into(), server_timestamp());
        fields.insert("updatedAt".into(), server_timestamp());
        fields.insert("replies".into(), json!([]));
        fields.insert("votes".into(), json!(0));
        fields.insert("votedBy".into(), json!([]));

        let id = self
            .store()
            .add_document(Collection::Tickets, fields)
            .await?;
        info!(ticket = %id, category = %ticket.category, "ticket created");

        self.notify_roles(
            &[Role::SupportAgent, Role::Admin],
            Some(&ticket.created_by),
            |staff| NewNotification {
                user_id: staff.id.clone(),
                title: "New ticket".into(),
                message: format!("{} opened \"{}\"", author.name, ticket.title),
                kind: NotificationKind::NewTicket,
                ticket_id: Some(id.clone()),
            },
        )
        .await;

        Ok(id)
    }

    /// Merge `update` into the ticket and refresh `updatedAt`.
    ///
    /// Any status may be set from any other; the lifecycle order is not
    /// enforced.
    pub async fn update_ticket(&self, id: &str, update: TicketUpdate) -> Result<(), MutationError> {
        let actor = self.require_ticket_manager("update_ticket")?;
        self.apply_ticket_update(&actor, id, update).await
    }

    /// Assign the ticket to `assignee`, or unassign it with `None`.
    pub async fn assign_ticket(&self, id: &str, assignee: Option<&str>) -> Result<(), MutationError> {
        let actor = self.require_ticket_manager("assign_ticket")?;
        let update = TicketUpdateBuilder::new()
            .assigned_to(assignee.map(String::from))
            .build();
        self.apply_ticket_update(&actor, id, update).await
    }

    /// Append a reply authored by the signed-in user.
    ///
    /// The thread is read from the server copy and written back whole with
    /// the new reply last; existing replies are carried over untouched.
    pub async fn add_reply(&self, ticket_id: &str, message: &str) -> Result<Reply, MutationError> {
        let author = self.require_user()?;
        let message = message.trim();
        if message.is_empty() {
            return Err(MutationError::Validation("reply message is required".into()));
        }

        let (doc, ticket): (Document, Ticket) = self.fetch(Collection::Tickets, ticket_id).await?;
        if !ticket.status.accepts_replies() {
            return Err(MutationError::TicketClosed(ticket_id.to_string()));
        }

        let now = Utc::now();
        let reply = Reply {
            id: generate_id()?,
            message: message.to_string(),
            author_id: author.uid.clone(),
            author_name: author.name.clone(),
            timestamp: now,
        };
        // Sentinels are not allowed inside arrays, so the reply carries a
        // client timestamp.
        let mut reply_fields = to_fields(&reply)?;
        reply_fields.insert("timestamp".into(), timestamp_value(now));

        let mut replies = doc
            .get("replies")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        replies.push(Value::Object(reply_fields));

        let mut fields = Fields::new();
        fields.insert("replies".into(), Value::Array(replies));
        fields.insert("updatedAt".into(), server_timestamp());
        self.store()
            .update_document(Collection::Tickets, ticket_id, fields)
            .await?;
        debug!(ticket = %ticket_id, reply = %reply.id, "reply added");

        if ticket.created_by != author.uid {
            self.notify(NewNotification {
                user_id: ticket.created_by.clone(),
                title: "New reply".into(),
                message: format!("{} replied to \"{}\"", author.name, ticket.title),
                kind: NotificationKind::TicketReply,
                ticket_id: Some(ticket_id.to_string()),
            })
            .await;
        }

        Ok(reply)
    }

    /// Toggle `user_id`'s vote: add it with `votes + 1`, or remove it with
    /// `votes - 1`.
    ///
    /// Reads the latest server copy, not the local mirror. There is no
    /// transaction, so two concurrent toggles can still lose one update.
    /// Does not refresh `updatedAt`.
    pub async fn vote_ticket(&self, ticket_id: &str, user_id: &str) -> Result<VoteToggle, MutationError> {
        if user_id.trim().is_empty() {
            return Err(MutationError::Validation("a voter id is required".into()));
        }
        let (_, ticket): (Document, Ticket) = self.fetch(Collection::Tickets, ticket_id).await?;
        let toggle = ticket.toggled_vote(user_id);

        let mut fields = Fields::new();
        fields.insert("votes".into(), json!(toggle.votes));
        fields.insert("votedBy".into(), json!(toggle.voted_by));
        self.store()
            .update_document(Collection::Tickets, ticket_id, fields)
            .await?;
        debug!(ticket = %ticket_id, voter = %user_id, added = toggle.added, votes = toggle.votes, "vote toggled");

        Ok(toggle)
    }

    /// The ticket as currently mirrored locally.
    #[must_use]
    pub fn ticket_by_id(&self, id: &str) -> Option<Ticket> {
        self.synchronizer().ticket_by_id(id)
    }

    async fn apply_ticket_update(
        &self,
        actor: &SessionUser,
        id: &str,
        update: TicketUpdate,
    ) -> Result<(), MutationError> {
        if let Some(category) = &update.category
            && category.trim().is_empty()
        {
            return Err(MutationError::Validation("a category is required".into()));
        }

        let (_, current): (Document, Ticket) = self.fetch(Collection::Tickets, id).await?;

        let mut fields = to_fields(&update)?;
        fields.insert("updatedAt".into(), server_timestamp());
        self.store()
            .update_document(Collection::Tickets, id, fields)
            .await?;
        debug!(ticket = %id, by = %actor.uid, "ticket updated");

        let creator = current.created_by.as_str();
        if let Some(status) = update.status
            && status != current.status
        {
            if !current.status.can_transition_to(status) {
                debug!(ticket = %id, from = %current.status, to = %status, "status moved outside the usual lifecycle");
            }
            if creator != actor.uid {
                self.notify(NewNotification {
                    user_id: creator.to_string(),
                    title: "Ticket status changed".into(),
                    message: format!("\"{}\" is now {}", current.title, status.as_str().replace('_', " ")),
                    kind: NotificationKind::TicketStatusChange,
                    ticket_id: Some(id.to_string()),
                })
                .await;
            }
        }

        if let Some(Some(assignee)) = &update.assigned_to
            && current.assigned_to.as_ref() != Some(assignee)
            && creator != actor.uid
        {
            self.notify(NewNotification {
                user_id: creator.to_string(),
                title: "Ticket assigned".into(),
                message: format!("\"{}\" has been assigned to an agent", current.title),
                kind: NotificationKind::TicketAssigned,
                ticket_id: Some(id.to_string()),
            })
            .await;
        }

        Ok(())
    }
}
