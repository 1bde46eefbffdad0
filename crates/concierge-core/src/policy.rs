// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row-level authorization predicates.
//!
//! Players see only their own requests (and those requests' messages);
//! concierges and admins see everything. Stores push [`RowScope`] into their
//! queries so hidden rows come back as "not found", never as "forbidden".

use serde::Serialize;

use crate::error::ConciergeError;
use crate::role::{Actor, Capability};
use crate::types::{Request, SenderType};

/// Which `requests` rows a reader may see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "scope", content = "player_id", rename_all = "snake_case")]
pub enum RowScope {
    All,
    OwnedBy(String),
}

impl RowScope {
    /// Owner filter to bind into SQL, `None` when unrestricted.
    pub fn owner(&self) -> Option<&str> {
        match self {
            RowScope::All => None,
            RowScope::OwnedBy(player_id) => Some(player_id),
        }
    }
}

/// Fail with [`ConciergeError::Authorization`] unless `actor` holds `capability`.
pub fn require(actor: &Actor, capability: Capability) -> Result<(), ConciergeError> {
    if actor.allows(capability) {
        Ok(())
    } else {
        tracing::debug!(user_id = %actor.user_id, %capability, "capability denied");
        Err(ConciergeError::unauthorized(capability.to_string()))
    }
}

/// Whether `actor` may speak (send, read receipts, unread counts) for `side`
/// in the conversation of `request`.
pub fn may_speak_as(actor: &Actor, request: &Request, side: SenderType) -> bool {
    match side {
        SenderType::Player => {
            actor.allows(Capability::SendAsPlayer) && request.player_id == actor.user_id
        }
        SenderType::Concierge => actor.allows(Capability::SendAsConcierge),
    }
}

/// Strip fields the actor may not read.
pub fn redact(mut request: Request, actor: &Actor) -> Request {
    if !actor.allows(Capability::ViewInternalNotes) {
        request.internal_notes = None;
    }
    request
}
