// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime change feed for inserted messages.

use async_trait::async_trait;

use crate::error::ConciergeError;
use crate::types::Message;

/// Live stream of messages inserted for one request.
///
/// Dropping the stream releases the subscription.
#[async_trait]
pub trait MessageStream: Send {
    fn request_id(&self) -> &str;

    /// Next inserted message, or `None` once the feed has shut down.
    async fn next_message(&mut self) -> Option<Message>;
}

/// Publish/subscribe on `messages` inserts, filtered by `request_id`.
pub trait ChangeFeed: Send + Sync {
    fn subscribe(&self, request_id: &str) -> Result<Box<dyn MessageStream>, ConciergeError>;

    /// Deliver an inserted row to the request's current subscribers.
    fn publish(&self, message: &Message);
}
