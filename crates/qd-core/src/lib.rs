//! # qd-core
//!
//! Core types shared across all QuickDesk crates.
//!
//! - Entity structs mirroring the documents of the five remote collections
//! - Status, role, priority and notification enums
//! - Creation payloads with their field validation
//! - The authenticated session user derived from auth + profile
//! - View-layer ticket/notification filters and admin analytics
//! - Cross-cutting error types

pub mod analytics;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod filters;
pub mod identity;
pub mod inputs;
