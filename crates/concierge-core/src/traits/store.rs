// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request and message persistence.
//!
//! Implementations must apply each call atomically: a failed update leaves
//! the row untouched.

use async_trait::async_trait;

use crate::error::ConciergeError;
use crate::policy::RowScope;
use crate::types::{
    ConversationSummary, Message, NewMessage, Request, RequestFilter, RequestUpdate, SenderType,
};

#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn insert_request(&self, request: &Request) -> Result<(), ConciergeError>;

    /// Fetch one row, or `None` if missing or outside `scope`.
    async fn get_request(
        &self,
        id: &str,
        scope: &RowScope,
    ) -> Result<Option<Request>, ConciergeError>;

    /// Rows inside `scope` matching `filter`, newest first.
    async fn list_requests(
        &self,
        scope: &RowScope,
        filter: &RequestFilter,
    ) -> Result<Vec<Request>, ConciergeError>;

    /// Apply `update` in one transaction and return the new row.
    ///
    /// Fails with `NotFound` outside `scope`, `Conflict` when the
    /// precondition does not hold, and `InvalidTransition` when the status
    /// policy rejects the edge.
    async fn update_request(
        &self,
        id: &str,
        scope: &RowScope,
        update: RequestUpdate,
    ) -> Result<Request, ConciergeError>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Insert a message and advance the owning request's `updated_at`
    /// in the same transaction.
    async fn insert_message(&self, message: &NewMessage) -> Result<Message, ConciergeError>;

    /// All messages of a request in ascending `created_at` order.
    async fn list_messages(&self, request_id: &str) -> Result<Vec<Message>, ConciergeError>;

    /// Unread messages authored by `from`.
    async fn count_unread(&self, request_id: &str, from: SenderType)
    -> Result<u64, ConciergeError>;

    /// Mark every unread message authored by `from` as read.
    async fn mark_read(&self, request_id: &str, from: SenderType) -> Result<u64, ConciergeError>;

    /// Requests inside `scope` that have messages, most recently updated
    /// first; unread counts are for messages authored by `unread_from`.
    async fn conversation_summaries(
        &self,
        scope: &RowScope,
        unread_from: SenderType,
    ) -> Result<Vec<ConversationSummary>, ConciergeError>;
}
