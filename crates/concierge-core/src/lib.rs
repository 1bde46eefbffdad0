// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Concierge request service.
//!
//! Holds the domain vocabulary shared across the workspace: requests and
//! messages, the status lifecycle graph, roles as capability sets, row-level
//! authorization predicates, the error taxonomy, and the store/feed traits
//! that backends implement.

pub mod clock;
pub mod error;
pub mod policy;
pub mod role;
pub mod status;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ConciergeError;
pub use policy::RowScope;
pub use role::{Actor, Capability, Role, RoleSet};
pub use status::{RequestStatus, TransitionPolicy};
pub use types::{
    Category, ConversationSummary, HealthStatus, Message, NewMessage, Request, RequestChange,
    RequestFilter, RequestUpdate, RoleAssignment, SenderType, Service, StatusBucket,
};

pub use traits::{
    Backend, Catalog, ChangeFeed, MessageStore, MessageStream, RequestStore, RoleDirectory,
};
