// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted entities and the value types passed across store traits.
//!
//! Field names mirror the `requests`, `messages`, `categories` and `services`
//! columns exactly; they are the external contract.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::role::Role;
use crate::status::{RequestStatus, TransitionPolicy};

/// Which side of a conversation authored a message.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SenderType {
    Player,
    Concierge,
}

impl SenderType {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// The opposite side of the conversation.
    pub fn other(self) -> SenderType {
        match self {
            SenderType::Player => SenderType::Concierge,
            SenderType::Concierge => SenderType::Player,
        }
    }
}

/// A single service request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    pub player_id: String,
    pub service_id: String,
    pub category_id: String,
    pub assigned_concierge_id: Option<String>,
    pub status: RequestStatus,
    pub title: String,
    pub description: Option<String>,
    pub priority: i64,
    /// Staff-only notes. `None` whenever the reader may not see them.
    pub internal_notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// One turn of a request's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub request_id: String,
    pub sender_id: String,
    pub sender_type: SenderType,
    pub content: String,
    pub is_read: bool,
    pub created_at: String,
}

/// A message about to be inserted. The store assigns `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub id: String,
    pub request_id: String,
    pub sender_id: String,
    pub sender_type: SenderType,
    pub content: String,
    /// Refuse the insert if the request is completed or cancelled.
    pub require_open: bool,
}

/// Catalog category (read-only for this subsystem).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub slug: String,
    pub name_fr: String,
    pub icon: String,
    pub display_order: i64,
    pub is_active: bool,
    pub created_at: String,
}

/// Catalog service, always owned by one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub category_id: String,
    pub slug: String,
    pub name_fr: String,
    pub description_fr: Option<String>,
    pub display_order: i64,
    pub is_active: bool,
    pub created_at: String,
}

/// Coarse grouping used by the "active / closed" request tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatusBucket {
    Active,
    Closed,
}

impl StatusBucket {
    pub fn contains(self, status: RequestStatus) -> bool {
        match self {
            StatusBucket::Active => !status.is_terminal(),
            StatusBucket::Closed => status.is_terminal(),
        }
    }
}

/// Filters for request listings. All fields are optional and combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestFilter {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub bucket: Option<StatusBucket>,
    /// Case-insensitive substring of the title.
    #[serde(default, rename = "q")]
    pub search: Option<String>,
}

/// A mutation applied to one request row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestChange {
    Status {
        to: RequestStatus,
        policy: TransitionPolicy,
    },
    InternalNotes(Option<String>),
    Assignee(Option<String>),
}

/// A change plus its optional optimistic-concurrency precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUpdate {
    pub change: RequestChange,
    /// When set, the row's current `updated_at` must equal this value.
    pub expected_updated_at: Option<String>,
}

impl RequestUpdate {
    pub fn new(change: RequestChange) -> Self {
        Self {
            change,
            expected_updated_at: None,
        }
    }

    pub fn if_unchanged_since(mut self, updated_at: impl Into<String>) -> Self {
        self.expected_updated_at = Some(updated_at.into());
        self
    }
}

/// Inbox row: a request that has at least one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub request: Request,
    pub last_message: Option<String>,
    pub last_message_at: Option<String>,
    pub message_count: u64,
    pub unread_count: u64,
}

/// One `user_roles` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub user_id: String,
    pub role: Role,
    pub created_at: String,
}

/// Health status reported by backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}
