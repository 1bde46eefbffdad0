// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime feed of inserted messages.
//!
//! One `tokio::sync::broadcast` channel per request id, created on first
//! subscribe and removed when its last subscriber leaves. Publishing to a
//! request nobody watches is a no-op.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, trace, warn};

use concierge_config::RealtimeConfig;
use concierge_core::{Backend, ChangeFeed, ConciergeError, HealthStatus, Message, MessageStream};

/// Why a subscription was refused.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("realtime feed is disabled")]
    Disabled,

    #[error("realtime feed is shut down")]
    Closed,

    #[error("subscriber limit of {max} reached")]
    SubscriberLimit { max: usize },
}

impl From<FeedError> for ConciergeError {
    fn from(err: FeedError) -> Self {
        ConciergeError::Transient {
            source: Box::new(err),
        }
    }
}

struct FeedInner {
    channels: DashMap<String, broadcast::Sender<Message>>,
    capacity: usize,
    max_subscribers: usize,
    active: AtomicUsize,
    enabled: bool,
    closed: AtomicBool,
}

impl FeedInner {
    /// Drop the channel of `request_id` if nobody listens anymore.
    fn prune(&self, request_id: &str) {
        if self
            .channels
            .remove_if(request_id, |_, tx| tx.receiver_count() == 0)
            .is_some()
        {
            trace!(request_id, "removed idle channel");
        }
    }
}

/// Publish/subscribe hub for message inserts. Cloning shares the hub.
#[derive(Clone)]
pub struct MessageFeed {
    inner: Arc<FeedInner>,
}

impl MessageFeed {
    /// `capacity` bounds per-request buffering; `max_subscribers` bounds the
    /// total number of live subscriptions.
    pub fn new(capacity: usize, max_subscribers: usize) -> Self {
        Self::build(capacity, max_subscribers, true)
    }

    pub fn from_config(config: &RealtimeConfig) -> Self {
        Self::build(
            config.channel_capacity,
            config.max_subscribers,
            config.enabled,
        )
    }

    fn build(capacity: usize, max_subscribers: usize, enabled: bool) -> Self {
        Self {
            inner: Arc::new(FeedInner {
                channels: DashMap::new(),
                capacity: capacity.max(1),
                max_subscribers,
                active: AtomicUsize::new(0),
                enabled,
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Start receiving messages inserted for `request_id` from now on.
    pub fn subscribe(&self, request_id: &str) -> Result<Subscription, ConciergeError> {
        let inner = &self.inner;
        if !inner.enabled {
            return Err(FeedError::Disabled.into());
        }
        if inner.closed.load(Ordering::Acquire) {
            return Err(FeedError::Closed.into());
        }

        let reserved = inner
            .active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < inner.max_subscribers).then_some(n + 1)
            });
        if reserved.is_err() {
            warn!(
                request_id,
                max = inner.max_subscribers,
                "subscriber limit reached"
            );
            return Err(FeedError::SubscriberLimit {
                max: inner.max_subscribers,
            }
            .into());
        }

        let receiver = inner
            .channels
            .entry(request_id.to_string())
            .or_insert_with(|| broadcast::channel(inner.capacity).0)
            .subscribe();
        debug!(request_id, "subscribed to message feed");

        Ok(Subscription {
            request_id: request_id.to_string(),
            receiver: Some(receiver),
            feed: Arc::clone(inner),
        })
    }

    /// Deliver `message` to current subscribers of its request.
    pub fn publish(&self, message: &Message) {
        if !self.inner.enabled {
            return;
        }
        if let Some(tx) = self.inner.channels.get(&message.request_id) {
            match tx.send(message.clone()) {
                Ok(receivers) => trace!(
                    request_id = %message.request_id,
                    message_id = %message.id,
                    receivers,
                    "published message"
                ),
                Err(_) => trace!(request_id = %message.request_id, "no live receivers"),
            }
        }
    }

    /// Live subscriptions on one request.
    pub fn subscriber_count(&self, request_id: &str) -> usize {
        self.inner
            .channels
            .get(request_id)
            .map_or(0, |tx| tx.receiver_count())
    }

    /// Live subscriptions across all requests.
    pub fn active_subscribers(&self) -> usize {
        self.inner.active.load(Ordering::Acquire)
    }

    /// Requests that currently have a channel.
    pub fn channel_count(&self) -> usize {
        self.inner.channels.len()
    }

    /// Refuse new subscriptions and end every open one.
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::AcqRel) {
            self.inner.channels.clear();
            debug!("message feed closed");
        }
    }
}

/// A live subscription to one request's inserts.
///
/// Released on [`Subscription::release`] or drop; the request's channel is
/// removed once its last subscription goes.
pub struct Subscription {
    request_id: String,
    receiver: Option<broadcast::Receiver<Message>>,
    feed: Arc<FeedInner>,
}

impl Subscription {
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Next inserted message, or `None` once the feed is closed or this
    /// subscription was released. A lagging receiver skips what it missed.
    pub async fn recv(&mut self) -> Option<Message> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(message) => return Some(message),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(request_id = %self.request_id, skipped, "subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn release(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(receiver) = self.receiver.take() {
            drop(receiver);
            self.feed.active.fetch_sub(1, Ordering::AcqRel);
            self.feed.prune(&self.request_id);
            debug!(request_id = %self.request_id, "subscription released");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

#[async_trait]
impl MessageStream for Subscription {
    fn request_id(&self) -> &str {
        &self.request_id
    }

    async fn next_message(&mut self) -> Option<Message> {
        self.recv().await
    }
}

impl ChangeFeed for MessageFeed {
    fn subscribe(&self, request_id: &str) -> Result<Box<dyn MessageStream>, ConciergeError> {
        Ok(Box::new(MessageFeed::subscribe(self, request_id)?))
    }

    fn publish(&self, message: &Message) {
        MessageFeed::publish(self, message);
    }
}

#[async_trait]
impl Backend for MessageFeed {
    fn name(&self) -> &str {
        "broadcast"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ConciergeError> {
        if !self.inner.enabled {
            return Ok(HealthStatus::Degraded("realtime disabled".into()));
        }
        if self.inner.closed.load(Ordering::Acquire) {
            return Ok(HealthStatus::Unhealthy("feed closed".into()));
        }
        if self.active_subscribers() >= self.inner.max_subscribers {
            return Ok(HealthStatus::Degraded("subscriber limit reached".into()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ConciergeError> {
        self.close();
        Ok(())
    }
}
