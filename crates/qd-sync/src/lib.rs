//! # qd-sync
//!
//! Live mirrors of the helpdesk collections and the mutations that write to
//! them.
//!
//! The [`EntitySynchronizer`] keeps one subscription per collection and
//! replaces the matching list on every snapshot. Users and role-upgrade
//! requests are only mirrored for admins; notifications only for a signed-in
//! user, filtered to that user. The [`HelpdeskService`] writes to the store
//! and never to the mirrors, so a mutation shows up locally once the next
//! snapshot arrives.
//!
//! [`AppState`] wires the session, synchronizer and service together over
//! one document store and one auth provider.

pub mod app;
pub mod error;
pub mod mapping;
pub mod repos;
pub mod seed;
pub mod service;
pub mod subscription;
pub mod synchronizer;
pub mod updates;

pub use app::{AppState, init_tracing};
pub use error::{MutationError, SyncError};
pub use mapping::SyncedState;
pub use service::HelpdeskService;
pub use subscription::Disposer;
pub use synchronizer::EntitySynchronizer;
