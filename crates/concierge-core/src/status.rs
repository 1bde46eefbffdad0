// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request status values and the lifecycle graph between them.
//!
//! ```text
//! new -> in_progress -> waiting_player -> confirmed -> completed*
//! any non-terminal -> cancelled*
//! ```

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::ConciergeError;

/// Status of a service request. The wire form is snake_case.
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
pub enum RequestStatus {
    New,
    InProgress,
    WaitingPlayer,
    Confirmed,
    Completed,
    Cancelled,
}

impl RequestStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [RequestStatus; 6] = [
        RequestStatus::New,
        RequestStatus::InProgress,
        RequestStatus::WaitingPlayer,
        RequestStatus::Confirmed,
        RequestStatus::Completed,
        RequestStatus::Cancelled,
    ];

    /// Wire name as stored in the `requests.status` column.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }

    /// Statuses directly reachable from `self`.
    pub fn successors(self) -> &'static [RequestStatus] {
        use RequestStatus::*;
        match self {
            New => &[InProgress, Cancelled],
            InProgress => &[WaitingPlayer, Cancelled],
            WaitingPlayer => &[Confirmed, Cancelled],
            Confirmed => &[Completed, Cancelled],
            Completed | Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, to: RequestStatus) -> bool {
        self.successors().contains(&to)
    }
}

/// How strictly status writes are checked against the lifecycle graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    /// Only edges of the lifecycle graph are accepted.
    #[default]
    Strict,
    /// Any status may be written over any other (legacy behaviour).
    Permissive,
}

impl TransitionPolicy {
    pub fn from_strict_flag(strict: bool) -> Self {
        if strict {
            TransitionPolicy::Strict
        } else {
            TransitionPolicy::Permissive
        }
    }

    /// Check a single status write.
    pub fn check(self, from: RequestStatus, to: RequestStatus) -> Result<(), ConciergeError> {
        match self {
            TransitionPolicy::Permissive => Ok(()),
            TransitionPolicy::Strict if from.can_transition_to(to) => Ok(()),
            TransitionPolicy::Strict => Err(ConciergeError::InvalidTransition { from, to }),
        }
    }
}
