//! Entity structs for all QuickDesk domain objects.
//!
//! Each entity mirrors one document of a remote collection. Field names follow
//! the document's `camelCase` keys; the store-assigned document id is attached
//! as `id` when a snapshot is mapped. All structs derive `JsonSchema` so the
//! payloads can be validated in tests.

mod category;
mod notification;
mod role_request;
mod ticket;
mod user;

pub use category::Category;
pub use notification::Notification;
pub use role_request::RoleUpgradeRequest;
pub use ticket::{Reply, Ticket, VoteToggle};
pub use user::UserProfile;
