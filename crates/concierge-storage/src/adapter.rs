// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the store, catalog and role traits.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use concierge_config::StorageConfig;
use concierge_core::{
    Backend, Catalog, Category, ConciergeError, ConversationSummary, HealthStatus, Message,
    MessageStore, NewMessage, Request, RequestFilter, RequestStore, RequestUpdate, Role,
    RoleAssignment, RoleDirectory, RoleSet, RowScope, SenderType, Service,
};

use crate::database::{Database, TxError, map_tr_err};
use crate::queries;

/// SQLite-backed store.
///
/// The database is opened by [`SqliteStore::initialize`]; every other call
/// fails until then.
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Construct and initialize in one step.
    pub async fn open(config: StorageConfig) -> Result<Self, ConciergeError> {
        let store = Self::new(config);
        store.initialize().await?;
        Ok(store)
    }

    pub async fn initialize(&self) -> Result<(), ConciergeError> {
        let db = Database::open(&self.config).await?;
        self.db
            .set(db)
            .map_err(|_| ConciergeError::Internal("storage already initialized".into()))?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    /// The underlying handle, for seeding and maintenance.
    pub fn database(&self) -> Result<&Database, ConciergeError> {
        self.db.get().ok_or_else(|| ConciergeError::Transient {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    pub async fn insert_category(&self, category: &Category) -> Result<(), ConciergeError> {
        queries::catalog::insert_category(self.database()?, category).await
    }

    pub async fn insert_service(&self, service: &Service) -> Result<(), ConciergeError> {
        queries::catalog::insert_service(self.database()?, service).await
    }
}

#[async_trait]
impl Backend for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ConciergeError> {
        let Some(db) = self.db.get() else {
            return Ok(HealthStatus::Unhealthy("storage not initialized".into()));
        };
        db.connection()
            .call(|conn| -> Result<(), TxError> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ConciergeError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl RequestStore for SqliteStore {
    async fn insert_request(&self, request: &Request) -> Result<(), ConciergeError> {
        queries::requests::insert_request(self.database()?, request).await
    }

    async fn get_request(
        &self,
        id: &str,
        scope: &RowScope,
    ) -> Result<Option<Request>, ConciergeError> {
        queries::requests::get_request(self.database()?, id, scope).await
    }

    async fn list_requests(
        &self,
        scope: &RowScope,
        filter: &RequestFilter,
    ) -> Result<Vec<Request>, ConciergeError> {
        queries::requests::list_requests(self.database()?, scope, filter).await
    }

    async fn update_request(
        &self,
        id: &str,
        scope: &RowScope,
        update: RequestUpdate,
    ) -> Result<Request, ConciergeError> {
        queries::requests::update_request(self.database()?, id, scope, update).await
    }
}

#[async_trait]
impl MessageStore for SqliteStore {
    async fn insert_message(&self, message: &NewMessage) -> Result<Message, ConciergeError> {
        queries::messages::insert_message(self.database()?, message).await
    }

    async fn list_messages(&self, request_id: &str) -> Result<Vec<Message>, ConciergeError> {
        queries::messages::list_messages(self.database()?, request_id).await
    }

    async fn count_unread(
        &self,
        request_id: &str,
        from: SenderType,
    ) -> Result<u64, ConciergeError> {
        queries::messages::count_unread(self.database()?, request_id, from).await
    }

    async fn mark_read(&self, request_id: &str, from: SenderType) -> Result<u64, ConciergeError> {
        queries::messages::mark_read(self.database()?, request_id, from).await
    }

    async fn conversation_summaries(
        &self,
        scope: &RowScope,
        unread_from: SenderType,
    ) -> Result<Vec<ConversationSummary>, ConciergeError> {
        queries::messages::conversation_summaries(self.database()?, scope, unread_from).await
    }
}

#[async_trait]
impl Catalog for SqliteStore {
    async fn find_category(&self, key: &str) -> Result<Option<Category>, ConciergeError> {
        queries::catalog::find_category(self.database()?, key).await
    }

    async fn find_service(&self, key: &str) -> Result<Option<Service>, ConciergeError> {
        queries::catalog::find_service(self.database()?, key).await
    }

    async fn active_categories(&self) -> Result<Vec<Category>, ConciergeError> {
        queries::catalog::active_categories(self.database()?).await
    }

    async fn active_services(&self, category_id: &str) -> Result<Vec<Service>, ConciergeError> {
        queries::catalog::active_services(self.database()?, category_id).await
    }
}

#[async_trait]
impl RoleDirectory for SqliteStore {
    async fn roles_for(&self, user_id: &str) -> Result<RoleSet, ConciergeError> {
        queries::roles::roles_for(self.database()?, user_id).await
    }

    async fn grant(&self, user_id: &str, role: Role) -> Result<bool, ConciergeError> {
        queries::roles::grant(self.database()?, user_id, role).await
    }

    async fn revoke(&self, user_id: &str, role: Role) -> Result<bool, ConciergeError> {
        queries::roles::revoke(self.database()?, user_id, role).await
    }

    async fn assignments(
        &self,
        role: Option<Role>,
    ) -> Result<Vec<RoleAssignment>, ConciergeError> {
        queries::roles::assignments(self.database()?, role).await
    }
}
