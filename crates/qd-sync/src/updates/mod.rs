//! Update builder types for entity mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some`
//! fields are serialized, so the output is exactly the set of document keys
//! to merge. `Option<Option<_>>` fields clear the key when set to `None`.

pub mod category;
pub mod profile;
pub mod ticket;
