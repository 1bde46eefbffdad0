// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request lifecycle: creation, status transitions, notes and assignment.

use serde::Deserialize;
use tracing::info;

use concierge_core::clock;
use concierge_core::policy::{self, redact};
use concierge_core::{
    Actor, Capability, ConciergeError, Request, RequestChange, RequestFilter, RequestStatus,
    RequestUpdate, Role,
};

use crate::Desk;

/// What a player submits to open a request.
///
/// `category` and `service` accept either an id or a slug.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RequestDraft {
    pub category: String,
    pub service: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

impl Desk {
    /// Open a new request for `actor` in status `new`.
    pub async fn create(&self, actor: &Actor, draft: RequestDraft) -> Result<Request, ConciergeError> {
        policy::require(actor, Capability::CreateRequest)?;

        let category = self
            .catalog
            .find_category(&draft.category)
            .await?
            .filter(|c| c.is_active)
            .ok_or_else(|| {
                ConciergeError::Validation(format!("unknown or inactive category `{}`", draft.category))
            })?;
        let service = self
            .catalog
            .find_service(&draft.service)
            .await?
            .filter(|s| s.is_active)
            .ok_or_else(|| {
                ConciergeError::Validation(format!("unknown or inactive service `{}`", draft.service))
            })?;
        if service.category_id != category.id {
            return Err(ConciergeError::Validation(format!(
                "service `{}` does not belong to category `{}`",
                service.slug, category.slug
            )));
        }

        let now = clock::now();
        let request = Request {
            id: uuid::Uuid::new_v4().to_string(),
            player_id: actor.user_id.clone(),
            service_id: service.id,
            category_id: category.id,
            assigned_concierge_id: None,
            status: RequestStatus::New,
            title: service.name_fr,
            description: non_blank(draft.description.as_deref()),
            priority: 0,
            internal_notes: None,
            created_at: now.clone(),
            updated_at: now,
        };
        self.requests.insert_request(&request).await?;

        info!(
            request_id = %request.id,
            player_id = %request.player_id,
            service = %service.slug,
            "request created"
        );
        Ok(redact(request, actor))
    }

    /// One request as `actor` may see it.
    pub async fn get(&self, request_id: &str, actor: &Actor) -> Result<Request, ConciergeError> {
        self.visible_request(request_id, actor)
            .await
            .map(|r| redact(r, actor))
    }

    /// Requests visible to `actor`, newest first.
    pub async fn list(
        &self,
        actor: &Actor,
        filter: &RequestFilter,
    ) -> Result<Vec<Request>, ConciergeError> {
        let rows = self.requests.list_requests(&actor.scope(), filter).await?;
        Ok(rows.into_iter().map(|r| redact(r, actor)).collect())
    }

    /// Move a request to `to`. Last write wins; see
    /// [`transition_if_unchanged`](Self::transition_if_unchanged) for the
    /// guarded variant.
    pub async fn transition(
        &self,
        request_id: &str,
        actor: &Actor,
        to: RequestStatus,
    ) -> Result<Request, ConciergeError> {
        self.apply_transition(request_id, actor, to, None).await
    }

    /// Like [`transition`](Self::transition), but fails with
    /// `Conflict` if the row's `updated_at` is no longer `seen_updated_at`.
    pub async fn transition_if_unchanged(
        &self,
        request_id: &str,
        actor: &Actor,
        to: RequestStatus,
        seen_updated_at: &str,
    ) -> Result<Request, ConciergeError> {
        self.apply_transition(request_id, actor, to, Some(seen_updated_at))
            .await
    }

    async fn apply_transition(
        &self,
        request_id: &str,
        actor: &Actor,
        to: RequestStatus,
        seen_updated_at: Option<&str>,
    ) -> Result<Request, ConciergeError> {
        policy::require(actor, Capability::TransitionStatus)?;

        let mut update = RequestUpdate::new(RequestChange::Status {
            to,
            policy: self.policy,
        });
        if let Some(seen) = seen_updated_at {
            update = update.if_unchanged_since(seen);
        }
        let updated = self
            .requests
            .update_request(request_id, &actor.scope(), update)
            .await?;

        info!(
            request_id,
            actor = %actor.user_id,
            status = %updated.status,
            "request status changed"
        );
        Ok(redact(updated, actor))
    }

    /// Replace the staff-only notes. Blank text clears them.
    pub async fn set_internal_notes(
        &self,
        request_id: &str,
        actor: &Actor,
        text: &str,
    ) -> Result<Request, ConciergeError> {
        policy::require(actor, Capability::EditInternalNotes)?;
        let updated = self
            .requests
            .update_request(
                request_id,
                &actor.scope(),
                RequestUpdate::new(RequestChange::InternalNotes(non_blank(Some(text)))),
            )
            .await?;
        info!(request_id, actor = %actor.user_id, "internal notes updated");
        Ok(redact(updated, actor))
    }

    /// Assign (or with `None`, unassign) the concierge handling a request.
    ///
    /// The target must hold the concierge or admin role.
    pub async fn assign_concierge(
        &self,
        request_id: &str,
        actor: &Actor,
        concierge_id: Option<&str>,
    ) -> Result<Request, ConciergeError> {
        policy::require(actor, Capability::AssignConcierge)?;

        if let Some(target) = concierge_id {
            let roles = self.roles.roles_for(target).await?;
            if !roles.contains(Role::Concierge) && !roles.contains(Role::Admin) {
                return Err(ConciergeError::Validation(format!(
                    "user `{target}` is not a concierge"
                )));
            }
        }

        let updated = self
            .requests
            .update_request(
                request_id,
                &actor.scope(),
                RequestUpdate::new(RequestChange::Assignee(concierge_id.map(str::to_string))),
            )
            .await?;
        info!(
            request_id,
            actor = %actor.user_id,
            assignee = concierge_id.unwrap_or("-"),
            "request assignment changed"
        );
        Ok(redact(updated, actor))
    }

    /// The unredacted row, or `NotFound` when outside the actor's scope.
    pub(crate) async fn visible_request(
        &self,
        request_id: &str,
        actor: &Actor,
    ) -> Result<Request, ConciergeError> {
        self.requests
            .get_request(request_id, &actor.scope())
            .await?
            .ok_or_else(|| ConciergeError::request_not_found(request_id))
    }
}

#[cfg(test)]
mod tests {
    use concierge_core::{StatusBucket, TransitionPolicy};
    use proptest::prelude::*;

    use super::*;
    use crate::testing::Fixture;

    fn draft(category: &str, service: &str) -> RequestDraft {
        RequestDraft {
            category: category.into(),
            service: service.into(),
            description: None,
        }
    }

    #[tokio::test]
    async fn create_starts_new_and_unassigned() {
        let fx = Fixture::new().await;
        let player = Actor::player("p1");
        let request = fx.passport_request(&player).await;

        assert_eq!(request.status, RequestStatus::New);
        assert_eq!(request.assigned_concierge_id, None);
        assert_eq!(request.player_id, "p1");
        assert_eq!(request.priority, 0);
        assert_eq!(request.title, "Renouvellement de passeport");
        assert_eq!(request.category_id, "cat-admin");
        assert_eq!(request.service_id, "svc-passport");
        assert_eq!(request.created_at, request.updated_at);
    }

    #[tokio::test]
    async fn create_accepts_ids_and_blanks_empty_description() {
        let fx = Fixture::new().await;
        let request = fx
            .desk
            .create(
                &Actor::player("p1"),
                RequestDraft {
                    description: Some("   ".into()),
                    ..draft("cat-travel", "svc-flight")
                },
            )
            .await
            .unwrap();
        assert_eq!(request.description, None);
        assert_eq!(request.title, "Réservation de vol");
    }

    #[tokio::test]
    async fn create_rejects_bad_catalog_references() {
        let fx = Fixture::new().await;
        let player = Actor::player("p1");
        for (category, service) in [
            ("missing", "passport-renewal"),
            ("administratif", "missing"),
            ("archive", "passport-renewal"),
            ("administratif", "fax"),
            ("voyage", "passport-renewal"),
        ] {
            let err = fx
                .desk
                .create(&player, draft(category, service))
                .await
                .unwrap_err();
            assert!(
                matches!(err, ConciergeError::Validation(_)),
                "{category}/{service}: {err}"
            );
        }
        assert!(
            fx.desk
                .list(&player, &RequestFilter::default())
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn staff_cannot_open_requests() {
        let fx = Fixture::new().await;
        let err = fx
            .desk
            .create(&Actor::concierge("c1"), draft("administratif", "passport-renewal"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConciergeError::Authorization { .. }));
    }

    #[tokio::test]
    async fn player_transition_is_always_unauthorized() {
        let fx = Fixture::new().await;
        let player = Actor::player("p1");
        let request = fx.passport_request(&player).await;

        for to in RequestStatus::ALL {
            let err = fx.desk.transition(&request.id, &player, to).await.unwrap_err();
            assert!(matches!(err, ConciergeError::Authorization { .. }), "{to}");
        }
        assert_eq!(
            fx.desk.get(&request.id, &player).await.unwrap().status,
            RequestStatus::New
        );
    }

    #[tokio::test]
    async fn concierge_walks_the_happy_path() {
        let fx = Fixture::new().await;
        let request = fx.passport_request(&Actor::player("p1")).await;
        let concierge = Actor::concierge("c1");

        let mut last = request.updated_at.clone();
        for to in [
            RequestStatus::InProgress,
            RequestStatus::WaitingPlayer,
            RequestStatus::Confirmed,
            RequestStatus::Completed,
        ] {
            let updated = fx.desk.transition(&request.id, &concierge, to).await.unwrap();
            assert_eq!(updated.status, to);
            assert!(updated.updated_at > last);
            last = updated.updated_at;
        }

        let err = fx
            .desk
            .transition(&request.id, &concierge, RequestStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConciergeError::InvalidTransition {
                from: RequestStatus::Completed,
                to: RequestStatus::InProgress
            }
        ));
    }

    #[tokio::test]
    async fn strict_policy_refuses_shortcuts_and_reversals() {
        let fx = Fixture::new().await;
        let request = fx.passport_request(&Actor::player("p1")).await;
        let concierge = Actor::concierge("c1");
        fx.desk
            .transition(&request.id, &concierge, RequestStatus::InProgress)
            .await
            .unwrap();

        let err = fx
            .desk
            .transition(&request.id, &concierge, RequestStatus::Confirmed)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConciergeError::InvalidTransition {
                from: RequestStatus::InProgress,
                to: RequestStatus::Confirmed
            }
        ));

        for (to, back) in [
            (RequestStatus::WaitingPlayer, RequestStatus::InProgress),
            (RequestStatus::Confirmed, RequestStatus::InProgress),
        ] {
            fx.desk.transition(&request.id, &concierge, to).await.unwrap();
            let err = fx
                .desk
                .transition(&request.id, &concierge, back)
                .await
                .unwrap_err();
            assert!(matches!(err, ConciergeError::InvalidTransition { from, .. } if from == to));
        }
        assert_eq!(
            fx.desk.get(&request.id, &concierge).await.unwrap().status,
            RequestStatus::Confirmed
        );
    }

    #[tokio::test]
    async fn same_status_is_invalid_when_strict() {
        let fx = Fixture::new().await;
        let request = fx.passport_request(&Actor::player("p1")).await;
        let err = fx
            .desk
            .transition(&request.id, &Actor::concierge("c1"), RequestStatus::New)
            .await
            .unwrap_err();
        assert!(matches!(err, ConciergeError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn permissive_policy_accepts_any_edge() {
        let fx = Fixture::new().await;
        let desk = fx.desk.clone().with_policy(TransitionPolicy::Permissive);
        let request = fx.passport_request(&Actor::player("p1")).await;
        let concierge = Actor::concierge("c1");

        let done = desk
            .transition(&request.id, &concierge, RequestStatus::Completed)
            .await
            .unwrap();
        assert_eq!(done.status, RequestStatus::Completed);
        let reopened = desk
            .transition(&request.id, &concierge, RequestStatus::New)
            .await
            .unwrap();
        assert_eq!(reopened.status, RequestStatus::New);
    }

    #[tokio::test]
    async fn guarded_transition_detects_concurrent_change() {
        let fx = Fixture::new().await;
        let request = fx.passport_request(&Actor::player("p1")).await;
        let c1 = Actor::concierge("c1");
        let admin = Actor::admin("a1");

        fx.desk
            .transition_if_unchanged(&request.id, &c1, RequestStatus::InProgress, &request.updated_at)
            .await
            .unwrap();
        let err = fx
            .desk
            .transition_if_unchanged(&request.id, &admin, RequestStatus::Cancelled, &request.updated_at)
            .await
            .unwrap_err();
        assert!(matches!(err, ConciergeError::Conflict { .. }));
        assert_eq!(
            fx.desk.get(&request.id, &admin).await.unwrap().status,
            RequestStatus::InProgress
        );
    }

    #[tokio::test]
    async fn missing_request_is_not_found() {
        let fx = Fixture::new().await;
        let err = fx
            .desk
            .transition("nope", &Actor::concierge("c1"), RequestStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, ConciergeError::NotFound { .. }));
    }

    #[tokio::test]
    async fn internal_notes_are_staff_only() {
        let fx = Fixture::new().await;
        let player = Actor::player("p1");
        let request = fx.passport_request(&player).await;
        let concierge = Actor::concierge("c1");

        let err = fx
            .desk
            .set_internal_notes(&request.id, &player, "sneaky")
            .await
            .unwrap_err();
        assert!(matches!(err, ConciergeError::Authorization { .. }));

        let noted = fx
            .desk
            .set_internal_notes(&request.id, &concierge, "Client VIP")
            .await
            .unwrap();
        assert_eq!(noted.internal_notes.as_deref(), Some("Client VIP"));
        assert_eq!(noted.status, RequestStatus::New);

        let seen_by_player = fx.desk.get(&request.id, &player).await.unwrap();
        assert_eq!(seen_by_player.internal_notes, None);
        let listed = fx.desk.list(&player, &RequestFilter::default()).await.unwrap();
        assert_eq!(listed[0].internal_notes, None);

        let cleared = fx
            .desk
            .set_internal_notes(&request.id, &concierge, "  ")
            .await
            .unwrap();
        assert_eq!(cleared.internal_notes, None);
    }

    #[tokio::test]
    async fn assignment_requires_staff_target() {
        let fx = Fixture::new().await;
        let request = fx.passport_request(&Actor::player("p1")).await;
        let admin = Actor::admin("a1");

        let err = fx
            .desk
            .assign_concierge(&request.id, &admin, Some("p1"))
            .await
            .unwrap_err();
        assert!(matches!(err, ConciergeError::Validation(_)));

        let assigned = fx
            .desk
            .assign_concierge(&request.id, &admin, Some("c1"))
            .await
            .unwrap();
        assert_eq!(assigned.assigned_concierge_id.as_deref(), Some("c1"));
        assert_eq!(assigned.status, RequestStatus::New);

        let cleared = fx
            .desk
            .assign_concierge(&request.id, &admin, None)
            .await
            .unwrap();
        assert_eq!(cleared.assigned_concierge_id, None);
    }

    #[tokio::test]
    async fn players_only_see_their_own_requests() {
        let fx = Fixture::new().await;
        let alice = Actor::player("alice");
        let bob = Actor::player("bob");
        let request = fx.passport_request(&alice).await;
        fx.passport_request(&bob).await;

        let err = fx.desk.get(&request.id, &bob).await.unwrap_err();
        assert!(matches!(err, ConciergeError::NotFound { .. }));
        assert_eq!(err.user_message(), "Demande introuvable");

        let mine = fx.desk.list(&alice, &RequestFilter::default()).await.unwrap();
        assert_eq!(mine.len(), 1);
        let all = fx
            .desk
            .list(&Actor::concierge("c1"), &RequestFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn bucket_filter_splits_active_and_closed() {
        let fx = Fixture::new().await;
        let player = Actor::player("p1");
        let open = fx.passport_request(&player).await;
        let closed = fx.passport_request(&player).await;
        fx.desk
            .transition(&closed.id, &Actor::concierge("c1"), RequestStatus::Cancelled)
            .await
            .unwrap();

        let active = fx
            .desk
            .list(
                &player,
                &RequestFilter {
                    bucket: Some(StatusBucket::Active),
                    ..RequestFilter::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(active.iter().map(|r| &r.id).collect::<Vec<_>>(), [&open.id]);
    }

    fn any_status() -> impl Strategy<Value = RequestStatus> {
        prop::sample::select(RequestStatus::ALL.to_vec())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn random_transition_sequences_keep_a_valid_status(
            targets in prop::collection::vec(any_status(), 1..12)
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let fx = Fixture::new().await;
                let request = fx.passport_request(&Actor::player("p1")).await;
                let concierge = Actor::concierge("c1");
                let mut expected = RequestStatus::New;

                for to in targets {
                    match fx.desk.transition(&request.id, &concierge, to).await {
                        Ok(updated) => {
                            prop_assert!(expected.can_transition_to(to));
                            expected = updated.status;
                        }
                        Err(ConciergeError::InvalidTransition { from, .. }) => {
                            prop_assert_eq!(from, expected);
                            prop_assert!(!expected.can_transition_to(to));
                        }
                        Err(other) => prop_assert!(false, "unexpected error {}", other),
                    }
                    let current = fx.desk.get(&request.id, &concierge).await.unwrap();
                    prop_assert_eq!(current.status, expected);
                    prop_assert!(RequestStatus::ALL.contains(&current.status));
                }
                Ok(())
            })?;
        }
    }
}
