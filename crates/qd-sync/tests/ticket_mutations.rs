//! Votes, replies and category deletion as seen through the mirrors.

mod common;

use pretty_assertions::assert_eq;
use qd_core::enums::{NotificationKind, Priority, Role, TicketStatus};
use qd_core::inputs::{NewCategory, NewTicket};
use qd_sync::MutationError;
use qd_sync::updates::ticket::TicketUpdateBuilder;

use common::{TestApp, signed_in};

async fn open_ticket(t: &TestApp, category: &str) -> String {
    let user = t.app.session.current_user().unwrap();
    let id = t
        .app
        .service
        .create_ticket(NewTicket::open(
            "Cannot reset password",
            "The reset email never arrives in my inbox.",
            category,
            Priority::High,
            user.uid,
        ))
        .await
        .unwrap();
    t.settle(|s| s.ticket(&id).is_some()).await.unwrap();
    id
}

#[tokio::test]
async fn voting_twice_restores_the_ticket() {
    let t = signed_in(Role::EndUser).await.unwrap();
    let id = open_ticket(&t, "Account Issues").await;
    let service = &t.app.service;

    let first = service.vote_ticket(&id, "u1").await.unwrap();
    assert!(first.added);
    let state = t
        .settle(|s| s.ticket(&id).is_some_and(|t| t.votes == 1))
        .await
        .unwrap();
    assert_eq!(state.ticket(&id).unwrap().voted_by, vec!["u1".to_string()]);

    let second = service.vote_ticket(&id, "u1").await.unwrap();
    assert!(!second.added);
    let state = t
        .settle(|s| s.ticket(&id).is_some_and(|t| t.votes == 0))
        .await
        .unwrap();
    assert!(state.ticket(&id).unwrap().voted_by.is_empty());
}

#[tokio::test]
async fn votes_track_distinct_voters() {
    let t = signed_in(Role::EndUser).await.unwrap();
    let id = open_ticket(&t, "Account Issues").await;
    let service = &t.app.service;

    for voter in ["u1", "u2", "u3", "u2"] {
        service.vote_ticket(&id, voter).await.unwrap();
    }
    let state = t
        .settle(|s| s.ticket(&id).is_some_and(|t| t.votes == 2))
        .await
        .unwrap();
    let ticket = state.ticket(&id).unwrap();
    assert_eq!(ticket.votes as usize, ticket.voted_by.len());
    assert_eq!(ticket.voted_by, vec!["u1".to_string(), "u3".to_string()]);
}

#[tokio::test]
async fn vote_without_voter_is_rejected() {
    let t = signed_in(Role::EndUser).await.unwrap();
    let id = open_ticket(&t, "Account Issues").await;
    let err = t.app.service.vote_ticket(&id, " ").await.unwrap_err();
    assert!(matches!(err, MutationError::Validation(_)));
}

#[tokio::test]
async fn replies_are_appended_in_order() {
    let t = signed_in(Role::EndUser).await.unwrap();
    let id = open_ticket(&t, "Account Issues").await;
    let service = &t.app.service;

    let first = service.add_reply(&id, "Still waiting").await.unwrap();
    let state = t
        .settle(|s| s.ticket(&id).is_some_and(|t| t.replies.len() == 1))
        .await
        .unwrap();
    let before = state.ticket(&id).unwrap().replies.clone();
    assert_eq!(before[0].id, first.id);
    assert_eq!(before[0].author_name, "John Doe");

    let second = service.add_reply(&id, "Any update?").await.unwrap();
    let state = t
        .settle(|s| s.ticket(&id).is_some_and(|t| t.replies.len() == 2))
        .await
        .unwrap();
    let after = &state.ticket(&id).unwrap().replies;
    assert_eq!(&after[..1], &before[..]);
    assert_eq!(after[1].id, second.id);
    assert_eq!(after[1].message, "Any update?");
}

#[tokio::test]
async fn blank_reply_is_rejected() {
    let t = signed_in(Role::EndUser).await.unwrap();
    let id = open_ticket(&t, "Account Issues").await;
    let err = t.app.service.add_reply(&id, "   ").await.unwrap_err();
    assert!(matches!(err, MutationError::Validation(_)));
}

#[tokio::test]
async fn closed_ticket_refuses_replies() {
    let t = signed_in(Role::SupportAgent).await.unwrap();
    let id = open_ticket(&t, "Account Issues").await;
    let service = &t.app.service;

    service
        .update_ticket(&id, TicketUpdateBuilder::new().status(TicketStatus::Closed).build())
        .await
        .unwrap();
    let err = service.add_reply(&id, "Reopen please").await.unwrap_err();
    assert!(matches!(err, MutationError::TicketClosed(ticket) if ticket == id));
}

#[tokio::test]
async fn staff_reply_notifies_the_creator() {
    let t = signed_in(Role::EndUser).await.unwrap();
    let id = open_ticket(&t, "Account Issues").await;

    t.app.session.logout().await.unwrap();
    t.login_as(Role::SupportAgent).await.unwrap();
    t.app.service.add_reply(&id, "Looking into it").await.unwrap();

    t.app.session.logout().await.unwrap();
    t.login_as(Role::EndUser).await.unwrap();
    let state = t
        .settle(|s| s.notifications.iter().any(|n| n.kind == NotificationKind::TicketReply))
        .await
        .unwrap();
    let notice = &state.notifications[0];
    assert_eq!(notice.user_id, "1");
    assert_eq!(notice.ticket_id.as_deref(), Some(id.as_str()));
    assert!(!notice.read);
}

#[tokio::test]
async fn deleting_a_category_leaves_tickets_orphaned() {
    let t = signed_in(Role::Admin).await.unwrap();
    let service = &t.app.service;

    let category = service
        .create_category(NewCategory::named("Hardware"))
        .await
        .unwrap();
    let id = open_ticket(&t, "Hardware").await;

    service.delete_category(&category).await.unwrap();
    let state = t.settle(|s| s.categories.is_empty()).await.unwrap();
    assert_eq!(state.ticket(&id).unwrap().category, "Hardware");
}

#[tokio::test]
async fn assignment_notifies_the_creator() {
    let t = signed_in(Role::EndUser).await.unwrap();
    let id = open_ticket(&t, "Account Issues").await;

    t.app.session.logout().await.unwrap();
    t.login_as(Role::SupportAgent).await.unwrap();
    t.app.service.assign_ticket(&id, Some("2")).await.unwrap();
    t.settle(|s| {
        s.ticket(&id)
            .is_some_and(|t| t.assigned_to.as_deref() == Some("2"))
    })
    .await
    .unwrap();

    t.app.service.assign_ticket(&id, None).await.unwrap();
    t.settle(|s| s.ticket(&id).is_some_and(|t| t.assigned_to.is_none()))
        .await
        .unwrap();

    t.app.session.logout().await.unwrap();
    t.login_as(Role::EndUser).await.unwrap();
    t.settle(|s| {
        s.notifications
            .iter()
            .any(|n| n.kind == NotificationKind::TicketAssigned)
    })
    .await
    .unwrap();
}
