// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use concierge_core::{
    Actor, Capability, Category, ConversationSummary, HealthStatus, Message, Request,
    RequestFilter, RequestStatus, Role, RoleAssignment, SenderType, Service,
};
use concierge_desk::RequestDraft;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Conversation side the caller acts as. Defaults to the side their roles
/// speak for.
#[derive(Debug, Default, Deserialize)]
pub struct SideQuery {
    #[serde(default, rename = "as")]
    pub side: Option<SenderType>,
}

/// Side used when the caller does not pick one.
pub fn default_side(actor: &Actor) -> SenderType {
    if actor.allows(Capability::SendAsConcierge) {
        SenderType::Concierge
    } else {
        SenderType::Player
    }
}

/// Request body for `POST /v1/requests/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct TransitionBody {
    pub status: RequestStatus,
    /// When present the change only applies if the request is unchanged.
    #[serde(default)]
    pub expected_updated_at: Option<String>,
}

/// Request body for `PUT /v1/requests/{id}/notes`.
#[derive(Debug, Deserialize)]
pub struct NotesBody {
    #[serde(default)]
    pub internal_notes: String,
}

/// Request body for `PUT /v1/requests/{id}/assignee`.
#[derive(Debug, Deserialize)]
pub struct AssigneeBody {
    #[serde(default)]
    pub concierge_id: Option<String>,
}

/// Request body for `POST /v1/requests/{id}/messages`.
#[derive(Debug, Deserialize)]
pub struct SendBody {
    pub content: String,
    #[serde(default)]
    pub sender_type: Option<SenderType>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChangedResponse {
    pub changed: bool,
}

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    #[serde(default)]
    pub role: Option<Role>,
}

/// One category with its active services.
#[derive(Debug, Serialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub category: Category,
    pub services: Vec<Service>,
}

#[derive(Debug, Serialize)]
pub struct BackendHealth {
    pub name: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: String,
    pub uptime_secs: u64,
    pub backends: Vec<BackendHealth>,
}

/// GET /health
///
/// Probes every registered backend. Responds 503 when any is unhealthy.
pub async fn get_health(State(state): State<GatewayState>) -> Response {
    let mut backends = Vec::with_capacity(state.health.backends.len());
    for backend in state.health.backends.iter() {
        let (status, detail) = match backend.health_check().await {
            Ok(HealthStatus::Healthy) => ("healthy", None),
            Ok(HealthStatus::Degraded(why)) => ("degraded", Some(why)),
            Ok(HealthStatus::Unhealthy(why)) => ("unhealthy", Some(why)),
            Err(e) => ("unhealthy", Some(e.to_string())),
        };
        backends.push(BackendHealth {
            name: backend.name().to_string(),
            status,
            detail,
        });
    }

    let overall = if backends.iter().any(|b| b.status == "unhealthy") {
        "unhealthy"
    } else if backends.iter().any(|b| b.status == "degraded") {
        "degraded"
    } else {
        "ok"
    };
    let code = if overall == "unhealthy" {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        code,
        Json(HealthResponse {
            status: overall,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.health.start_time.elapsed().as_secs(),
            backends,
        }),
    )
        .into_response()
}

/// POST /v1/requests
pub async fn create_request(
    State(state): State<GatewayState>,
    Extension(actor): Extension<Actor>,
    Json(draft): Json<RequestDraft>,
) -> Result<(StatusCode, Json<Request>), ApiError> {
    let request = state.desk.create(&actor, draft).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /v1/requests?status=&bucket=&q=
pub async fn list_requests(
    State(state): State<GatewayState>,
    Extension(actor): Extension<Actor>,
    Query(filter): Query<RequestFilter>,
) -> Result<Json<Vec<Request>>, ApiError> {
    Ok(Json(state.desk.list(&actor, &filter).await?))
}

/// GET /v1/requests/{id}
pub async fn get_request(
    State(state): State<GatewayState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<Request>, ApiError> {
    Ok(Json(state.desk.get(&id, &actor).await?))
}

/// POST /v1/requests/{id}/status
pub async fn transition_request(
    State(state): State<GatewayState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(body): Json<TransitionBody>,
) -> Result<Json<Request>, ApiError> {
    let updated = match body.expected_updated_at {
        Some(seen) => {
            state
                .desk
                .transition_if_unchanged(&id, &actor, body.status, &seen)
                .await?
        }
        None => state.desk.transition(&id, &actor, body.status).await?,
    };
    Ok(Json(updated))
}

/// PUT /v1/requests/{id}/notes
pub async fn set_notes(
    State(state): State<GatewayState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(body): Json<NotesBody>,
) -> Result<Json<Request>, ApiError> {
    Ok(Json(
        state
            .desk
            .set_internal_notes(&id, &actor, &body.internal_notes)
            .await?,
    ))
}

/// PUT /v1/requests/{id}/assignee
pub async fn set_assignee(
    State(state): State<GatewayState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(body): Json<AssigneeBody>,
) -> Result<Json<Request>, ApiError> {
    Ok(Json(
        state
            .desk
            .assign_concierge(&id, &actor, body.concierge_id.as_deref())
            .await?,
    ))
}

/// GET /v1/requests/{id}/messages
pub async fn list_messages(
    State(state): State<GatewayState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    Ok(Json(state.desk.list_by_request(&id, &actor).await?))
}

/// POST /v1/requests/{id}/messages
pub async fn send_message(
    State(state): State<GatewayState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(body): Json<SendBody>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let side = body.sender_type.unwrap_or_else(|| default_side(&actor));
    let message = state.desk.send(&id, &actor, side, &body.content).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /v1/requests/{id}/unread?as=
pub async fn unread_count(
    State(state): State<GatewayState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Query(query): Query<SideQuery>,
) -> Result<Json<CountResponse>, ApiError> {
    let side = query.side.unwrap_or_else(|| default_side(&actor));
    let count = state.desk.unread_count_for(&id, &actor, side).await?;
    Ok(Json(CountResponse { count }))
}

/// POST /v1/requests/{id}/read?as=
pub async fn mark_read(
    State(state): State<GatewayState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Query(query): Query<SideQuery>,
) -> Result<Json<CountResponse>, ApiError> {
    let side = query.side.unwrap_or_else(|| default_side(&actor));
    let count = state.desk.mark_read(&id, &actor, side).await?;
    Ok(Json(CountResponse { count }))
}

/// GET /v1/inbox?as=
pub async fn inbox(
    State(state): State<GatewayState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<SideQuery>,
) -> Result<Json<Vec<ConversationSummary>>, ApiError> {
    let side = query.side.unwrap_or_else(|| default_side(&actor));
    Ok(Json(state.desk.inbox(&actor, side).await?))
}

/// GET /v1/catalog
///
/// Active categories with their active services, in display order.
pub async fn catalog(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<CatalogEntry>>, ApiError> {
    let catalog = state.desk.catalog();
    let mut entries = Vec::new();
    for category in catalog.active_categories().await? {
        let services = catalog.active_services(&category.id).await?;
        entries.push(CatalogEntry { category, services });
    }
    Ok(Json(entries))
}

/// GET /v1/roles?role=
pub async fn list_roles(
    State(state): State<GatewayState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<RoleQuery>,
) -> Result<Json<Vec<RoleAssignment>>, ApiError> {
    Ok(Json(state.desk.list_role_assignments(&actor, query.role).await?))
}

/// PUT /v1/roles/{user_id}/{role}
pub async fn grant_role(
    State(state): State<GatewayState>,
    Extension(actor): Extension<Actor>,
    Path((user_id, role)): Path<(String, Role)>,
) -> Result<Json<ChangedResponse>, ApiError> {
    let changed = state.desk.grant_role(&actor, &user_id, role).await?;
    Ok(Json(ChangedResponse { changed }))
}

/// DELETE /v1/roles/{user_id}/{role}
pub async fn revoke_role(
    State(state): State<GatewayState>,
    Extension(actor): Extension<Actor>,
    Path((user_id, role)): Path<(String, Role)>,
) -> Result<Json<ChangedResponse>, ApiError> {
    let changed = state.desk.revoke_role(&actor, &user_id, role).await?;
    Ok(Json(ChangedResponse { changed }))
}
