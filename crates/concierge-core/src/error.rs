// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy shared by every Concierge crate.

use thiserror::Error;

use crate::status::RequestStatus;

/// The primary error type returned by store, feed and desk operations.
#[derive(Debug, Error)]
pub enum ConciergeError {
    /// Malformed or missing input (empty message, inactive catalog reference).
    #[error("validation error: {0}")]
    Validation(String),

    /// The acting identity lacks the capability required for the operation.
    #[error("not authorized to {action}")]
    Authorization { action: String },

    /// The requested status change is not an edge of the lifecycle graph.
    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },

    /// The row does not exist or is not visible to the caller.
    ///
    /// Row-level authorization reports hidden rows through this variant too,
    /// so callers cannot probe for the existence of other players' requests.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The row changed after the caller read it.
    #[error("{entity} {id} was modified concurrently")]
    Conflict { entity: &'static str, id: String },

    /// Backend failure (database, feed capacity). Safe to retry by hand.
    #[error("backend unavailable: {source}")]
    Transient {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors detected at runtime.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ConciergeError {
    /// Shorthand for an authorization failure.
    pub fn unauthorized(action: impl Into<String>) -> Self {
        Self::Authorization {
            action: action.into(),
        }
    }

    /// Shorthand for a missing request row.
    pub fn request_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "request",
            id: id.into(),
        }
    }

    /// Stable machine-readable code, used on the wire and in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Authorization { .. } => "authorization",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::NotFound { .. } => "not_found",
            Self::Conflict { .. } => "conflict",
            Self::Transient { .. } => "transient",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether a user-initiated retry of the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Localized message shown to end users.
    ///
    /// Never includes row ids or internal details.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Certaines informations sont invalides ou manquantes.",
            Self::Authorization { .. } => "Vous n'êtes pas autorisé à effectuer cette action.",
            Self::InvalidTransition { .. } => "Ce changement de statut n'est pas possible.",
            Self::NotFound { entity: "message", .. } => "Message introuvable",
            Self::NotFound { .. } => "Demande introuvable",
            Self::Conflict { .. } => {
                "La demande a été modifiée entre-temps. Rechargez avant de réessayer."
            }
            Self::Transient { .. } => "Service momentanément indisponible. Réessayez.",
            Self::Config(_) | Self::Internal(_) => "Une erreur inattendue est survenue.",
        }
    }
}
