//! Repository modules implementing the mutations for each helpdesk entity.
//!
//! Each module adds methods to `HelpdeskService` via `impl HelpdeskService` blocks.

pub mod category;
pub mod notification;
pub mod role_request;
pub mod ticket;
pub mod user;
