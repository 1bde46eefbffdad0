// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from domain errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use concierge_core::ConciergeError;

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Localized message safe to show to the user.
    pub error: String,
    /// Stable machine-readable code.
    pub code: String,
}

/// Handler error. Wraps a [`ConciergeError`] or a missing identity.
#[derive(Debug)]
pub enum ApiError {
    Unauthenticated,
    Domain(ConciergeError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Domain(e) => match e {
                ConciergeError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ConciergeError::Authorization { .. } => StatusCode::FORBIDDEN,
                ConciergeError::InvalidTransition { .. } | ConciergeError::Conflict { .. } => {
                    StatusCode::CONFLICT
                }
                ConciergeError::NotFound { .. } => StatusCode::NOT_FOUND,
                ConciergeError::Transient { .. } => StatusCode::SERVICE_UNAVAILABLE,
                ConciergeError::Config(_) | ConciergeError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            ApiError::Unauthenticated => ErrorResponse {
                error: "Authentification requise.".to_string(),
                code: "unauthenticated".to_string(),
            },
            ApiError::Domain(e) => ErrorResponse {
                error: e.user_message().to_string(),
                code: e.kind().to_string(),
            },
        }
    }
}

impl From<ConciergeError> for ApiError {
    fn from(e: ConciergeError) -> Self {
        ApiError::Domain(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let ApiError::Domain(e) = &self {
            if status.is_server_error() {
                tracing::error!(error = %e, code = e.kind(), "request failed");
            } else {
                tracing::debug!(error = %e, code = e.kind(), "request rejected");
            }
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use concierge_core::RequestStatus;

    use super::*;

    fn status_of(e: ConciergeError) -> StatusCode {
        ApiError::from(e).status()
    }

    #[test]
    fn domain_errors_map_to_http_status() {
        assert_eq!(
            status_of(ConciergeError::Validation("x".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(ConciergeError::unauthorized("x")),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(ConciergeError::InvalidTransition {
                from: RequestStatus::Completed,
                to: RequestStatus::New,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ConciergeError::Conflict {
                entity: "request",
                id: "r1".into()
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ConciergeError::request_not_found("r1")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(ConciergeError::Transient {
                source: "database is locked".into()
            }),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(ApiError::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn body_never_leaks_identifiers() {
        let body = ApiError::from(ConciergeError::request_not_found("secret-id")).body();
        assert_eq!(body.error, "Demande introuvable");
        assert_eq!(body.code, "not_found");
        assert!(!body.error.contains("secret-id"));
    }
}
