// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full desk stack: temp SQLite database with
//! the reference catalog, the broadcast feed, and role assignments.

use std::sync::Arc;

use concierge_bus::MessageFeed;
use concierge_config::{ConciergeConfig, RealtimeConfig, StorageConfig, WorkflowConfig};
use concierge_core::{Actor, ConciergeError, Request, Role, RoleDirectory, TransitionPolicy};
use concierge_desk::{Desk, RequestDraft};
use concierge_storage::SqliteStore;

use crate::catalog;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    strict_transitions: bool,
    realtime: RealtimeConfig,
    roles: Vec<(String, Role)>,
    seed_catalog: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            strict_transitions: true,
            realtime: RealtimeConfig::default(),
            roles: Vec::new(),
            seed_catalog: true,
        }
    }

    /// Accept any status over any other.
    pub fn permissive_transitions(mut self) -> Self {
        self.strict_transitions = false;
        self
    }

    pub fn with_realtime(mut self, realtime: RealtimeConfig) -> Self {
        self.realtime = realtime;
        self
    }

    /// Record `role` for `user_id` before the harness is handed out.
    pub fn with_role(mut self, user_id: &str, role: Role) -> Self {
        self.roles.push((user_id.to_string(), role));
        self
    }

    /// Start from an empty catalog.
    pub fn without_catalog(mut self) -> Self {
        self.seed_catalog = false;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, ConciergeError> {
        let temp_dir = tempfile::TempDir::new().map_err(|e| ConciergeError::Transient {
            source: Box::new(e),
        })?;
        let db_path = temp_dir.path().join("test.db");

        let config = ConciergeConfig {
            storage: StorageConfig {
                database_path: db_path.to_string_lossy().to_string(),
                ..StorageConfig::default()
            },
            realtime: self.realtime,
            workflow: WorkflowConfig {
                strict_transitions: self.strict_transitions,
            },
            ..ConciergeConfig::default()
        };

        let store = Arc::new(SqliteStore::open(config.storage.clone()).await?);
        if self.seed_catalog {
            catalog::seed(&store).await?;
        }
        for (user_id, role) in &self.roles {
            store.grant(user_id, *role).await?;
        }

        let feed = MessageFeed::from_config(&config.realtime);
        let desk = Desk::from_store(Arc::clone(&store), Arc::new(feed.clone()))
            .with_policy(TransitionPolicy::from_strict_flag(
                config.workflow.strict_transitions,
            ));
        tracing::debug!(db = %db_path.display(), "test harness ready");

        Ok(TestHarness {
            desk,
            store,
            feed,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment over a temp database.
pub struct TestHarness {
    pub desk: Desk,
    /// SQLite store (temp DB, cleaned up on drop).
    pub store: Arc<SqliteStore>,
    pub feed: MessageFeed,
    pub config: ConciergeConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Resolve `user_id` through the role directory.
    pub async fn actor(&self, user_id: &str) -> Actor {
        match self.desk.resolve_actor(user_id).await {
            Ok(actor) => actor,
            Err(e) => panic!("resolving {user_id}: {e}"),
        }
    }

    /// Open the reference passport renewal request for `player`.
    pub async fn open_passport_request(&self, player: &Actor) -> Result<Request, ConciergeError> {
        self.desk
            .create(
                player,
                RequestDraft {
                    category: catalog::ADMINISTRATIF.to_string(),
                    service: catalog::PASSPORT_RENEWAL.to_string(),
                    description: None,
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use concierge_core::{Catalog, RequestFilter, RequestStatus};

    use super::*;

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::builder().build().await.unwrap();
        let player = harness.actor("p1").await;
        assert!(
            harness
                .desk
                .list(&player, &RequestFilter::default())
                .await
                .unwrap()
                .is_empty()
        );
        assert_eq!(harness.store.active_categories().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn with_role_is_applied() {
        let harness = TestHarness::builder()
            .with_role("c1", Role::Concierge)
            .build()
            .await
            .unwrap();
        assert!(harness.actor("c1").await.roles.contains(Role::Concierge));
    }

    #[tokio::test]
    async fn permissive_transitions_skip_the_graph() {
        let harness = TestHarness::builder()
            .permissive_transitions()
            .with_role("c1", Role::Concierge)
            .build()
            .await
            .unwrap();
        let request = harness
            .open_passport_request(&harness.actor("p1").await)
            .await
            .unwrap();
        let done = harness
            .desk
            .transition(&request.id, &harness.actor("c1").await, RequestStatus::Completed)
            .await
            .unwrap();
        assert_eq!(done.status, RequestStatus::Completed);
    }

    #[tokio::test]
    async fn without_catalog_rejects_creation() {
        let harness = TestHarness::builder().without_catalog().build().await.unwrap();
        let err = harness
            .open_passport_request(&harness.actor("p1").await)
            .await
            .unwrap_err();
        assert!(matches!(err, ConciergeError::Validation(_)));
    }

    #[tokio::test]
    async fn temp_db_is_unique_per_harness() {
        let h1 = TestHarness::builder().build().await.unwrap();
        let h2 = TestHarness::builder().build().await.unwrap();
        let player = h1.actor("p1").await;
        h1.open_passport_request(&player).await.unwrap();

        let filter = RequestFilter::default();
        assert_eq!(h1.desk.list(&player, &filter).await.unwrap().len(), 1);
        assert!(h2.desk.list(&player, &filter).await.unwrap().is_empty());
    }
}
