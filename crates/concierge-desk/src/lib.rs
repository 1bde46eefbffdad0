// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Application services for the Concierge request desk.
//!
//! [`Desk`] ties the stores, the catalog, the role directory and the realtime
//! feed together and is the only place capability checks happen. Every
//! operation takes the acting [`Actor`](concierge_core::Actor) explicitly.

pub mod client;
pub mod conversation;
pub mod lifecycle;
pub mod messaging;
pub mod roles;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use concierge_core::{
    Catalog, ChangeFeed, MessageStore, RequestStore, RoleDirectory, TransitionPolicy,
};

pub use client::{ClientSlot, Session};
pub use conversation::{Alignment, ConversationView};
pub use lifecycle::RequestDraft;

/// Entry point for every request and messaging operation.
///
/// Cheap to clone: all collaborators sit behind `Arc`.
#[derive(Clone)]
pub struct Desk {
    requests: Arc<dyn RequestStore>,
    messages: Arc<dyn MessageStore>,
    catalog: Arc<dyn Catalog>,
    roles: Arc<dyn RoleDirectory>,
    feed: Arc<dyn ChangeFeed>,
    policy: TransitionPolicy,
}

impl Desk {
    pub fn new(
        requests: Arc<dyn RequestStore>,
        messages: Arc<dyn MessageStore>,
        catalog: Arc<dyn Catalog>,
        roles: Arc<dyn RoleDirectory>,
        feed: Arc<dyn ChangeFeed>,
    ) -> Self {
        Self {
            requests,
            messages,
            catalog,
            roles,
            feed,
            policy: TransitionPolicy::default(),
        }
    }

    /// Build from one backend that implements every store trait.
    pub fn from_store<S>(store: Arc<S>, feed: Arc<dyn ChangeFeed>) -> Self
    where
        S: RequestStore + MessageStore + Catalog + RoleDirectory + 'static,
    {
        Self::new(store.clone(), store.clone(), store.clone(), store, feed)
    }

    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn catalog(&self) -> &Arc<dyn Catalog> {
        &self.catalog
    }

    pub fn feed(&self) -> &Arc<dyn ChangeFeed> {
        &self.feed
    }

    /// A [`ClientSlot`] bound to this desk.
    pub fn client(&self) -> ClientSlot {
        ClientSlot::new(self.clone())
    }
}
