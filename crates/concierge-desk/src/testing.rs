// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-crate fixture: a desk over a temporary SQLite store and a live feed.

use std::sync::Arc;

use concierge_bus::MessageFeed;
use concierge_config::StorageConfig;
use concierge_core::{Actor, Category, Request, RoleDirectory, Role, Service};
use concierge_storage::SqliteStore;
use tempfile::TempDir;

use crate::{Desk, RequestDraft};

const SEEDED_AT: &str = "2026-01-01T00:00:00.000Z";

pub(crate) struct Fixture {
    pub desk: Desk,
    pub store: Arc<SqliteStore>,
    pub feed: MessageFeed,
    _dir: TempDir,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_feed(MessageFeed::new(64, 64)).await
    }

    pub async fn with_feed(feed: MessageFeed) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(StorageConfig {
            database_path: dir.path().join("desk.db").to_string_lossy().into_owned(),
            ..StorageConfig::default()
        })
        .await
        .unwrap();

        for (id, slug, active) in [
            ("cat-admin", "administratif", true),
            ("cat-travel", "voyage", true),
            ("cat-old", "archive", false),
        ] {
            store
                .insert_category(&Category {
                    id: id.into(),
                    slug: slug.into(),
                    name_fr: slug.into(),
                    icon: String::new(),
                    display_order: 0,
                    is_active: active,
                    created_at: SEEDED_AT.into(),
                })
                .await
                .unwrap();
        }
        for (id, category_id, slug, name, active) in [
            (
                "svc-passport",
                "cat-admin",
                "passport-renewal",
                "Renouvellement de passeport",
                true,
            ),
            ("svc-fax", "cat-admin", "fax", "Télécopie", false),
            ("svc-flight", "cat-travel", "flight", "Réservation de vol", true),
        ] {
            store
                .insert_service(&Service {
                    id: id.into(),
                    category_id: category_id.into(),
                    slug: slug.into(),
                    name_fr: name.into(),
                    description_fr: None,
                    display_order: 0,
                    is_active: active,
                    created_at: SEEDED_AT.into(),
                })
                .await
                .unwrap();
        }
        store.grant("c1", Role::Concierge).await.unwrap();
        store.grant("a1", Role::Admin).await.unwrap();

        let store = Arc::new(store);
        let desk = Desk::from_store(store.clone(), Arc::new(feed.clone()));
        Self {
            desk,
            store,
            feed,
            _dir: dir,
        }
    }

    pub async fn passport_request(&self, player: &Actor) -> Request {
        self.desk
            .create(
                player,
                RequestDraft {
                    category: "administratif".into(),
                    service: "passport-renewal".into(),
                    description: Some("Mon passeport expire en mars".into()),
                },
            )
            .await
            .unwrap()
    }
}
