// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-identity desk handle with an explicit sign-out lifecycle.
//!
//! A [`ClientSlot`] holds at most one [`Session`]. It is created lazily on
//! first use, torn down by [`ClientSlot::sign_out`], and rebuilt for the
//! next identity. Every teardown bumps a generation counter so a session
//! obtained before sign-out can tell it is stale.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwapOption;
use tokio::sync::Mutex;
use tracing::info;

use concierge_core::{Actor, ConciergeError};

use crate::Desk;

/// A signed-in identity bound to the desk.
#[derive(Clone)]
pub struct Session {
    actor: Actor,
    desk: Desk,
    generation: u64,
}

impl Session {
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn desk(&self) -> &Desk {
        &self.desk
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("actor", &self.actor)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

pub struct ClientSlot {
    desk: Desk,
    current: ArcSwapOption<Session>,
    generation: AtomicU64,
    init: Mutex<()>,
}

impl ClientSlot {
    pub fn new(desk: Desk) -> Self {
        Self {
            desk,
            current: ArcSwapOption::empty(),
            generation: AtomicU64::new(0),
            init: Mutex::new(()),
        }
    }

    /// The session for `user_id`, creating it on first use.
    ///
    /// Fails with `Authorization` while a different identity is signed in;
    /// call [`sign_out`](Self::sign_out) first.
    pub async fn get_or_init(&self, user_id: &str) -> Result<Arc<Session>, ConciergeError> {
        if let Some(session) = self.matching(user_id)? {
            return Ok(session);
        }

        let _guard = self.init.lock().await;
        if let Some(session) = self.matching(user_id)? {
            return Ok(session);
        }

        let actor = self.desk.resolve_actor(user_id).await?;
        let session = Arc::new(Session {
            actor,
            desk: self.desk.clone(),
            generation: self.generation.load(Ordering::Acquire),
        });
        self.current.store(Some(Arc::clone(&session)));
        info!(user_id, roles = ?session.actor.roles, generation = session.generation, "session started");
        Ok(session)
    }

    pub fn current(&self) -> Option<Arc<Session>> {
        self.current.load_full()
    }

    /// Tear down the current session. Returns `false` when nobody was
    /// signed in; the generation only advances on an actual teardown.
    pub fn sign_out(&self) -> bool {
        match self.current.swap(None) {
            Some(session) => {
                let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
                info!(user_id = %session.actor.user_id, generation, "session ended");
                true
            }
            None => false,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Whether `session` is still the live one.
    pub fn is_current(&self, session: &Session) -> bool {
        session.generation == self.generation()
            && self
                .current
                .load()
                .as_ref()
                .is_some_and(|live| std::ptr::eq(live.as_ref(), session))
    }

    fn matching(&self, user_id: &str) -> Result<Option<Arc<Session>>, ConciergeError> {
        match self.current.load_full() {
            Some(session) if session.actor.user_id == user_id => Ok(Some(session)),
            Some(_) => Err(ConciergeError::unauthorized("switch identity without signing out")),
            None => Ok(None),
        }
    }
}
