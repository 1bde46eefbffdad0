// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests driving `SqliteStore` through the core traits.

use std::sync::Arc;

use concierge_config::StorageConfig;
use concierge_core::{
    Category, ConciergeError, MessageStore, NewMessage, Request, RequestChange, RequestStatus,
    RequestStore, RequestUpdate, RowScope, SenderType, Service, TransitionPolicy,
};
use concierge_storage::SqliteStore;

async fn store() -> (Arc<SqliteStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::open(StorageConfig {
        database_path: dir.path().join("it.db").to_string_lossy().into_owned(),
        ..StorageConfig::default()
    })
    .await
    .unwrap();

    store
        .insert_category(&Category {
            id: "c".into(),
            slug: "administratif".into(),
            name_fr: "Administratif".into(),
            icon: String::new(),
            display_order: 0,
            is_active: true,
            created_at: "2026-01-01T00:00:00.000Z".into(),
        })
        .await
        .unwrap();
    store
        .insert_service(&Service {
            id: "s".into(),
            category_id: "c".into(),
            slug: "passport-renewal".into(),
            name_fr: "Renouvellement de passeport".into(),
            description_fr: None,
            display_order: 0,
            is_active: true,
            created_at: "2026-01-01T00:00:00.000Z".into(),
        })
        .await
        .unwrap();
    (Arc::new(store), dir)
}

fn request(id: &str) -> Request {
    Request {
        id: id.into(),
        player_id: "p1".into(),
        service_id: "s".into(),
        category_id: "c".into(),
        assigned_concierge_id: None,
        status: RequestStatus::New,
        title: "Renouvellement de passeport".into(),
        description: None,
        priority: 0,
        internal_notes: None,
        created_at: "2026-01-01T00:00:00.000Z".into(),
        updated_at: "2026-01-01T00:00:00.000Z".into(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_guarded_transitions_admit_exactly_one_writer() {
    let (store, _dir) = store().await;
    let seen = request("r1");
    store.insert_request(&seen).await.unwrap();

    let mut handles = Vec::new();
    for target in [
        RequestStatus::InProgress,
        RequestStatus::Cancelled,
        RequestStatus::InProgress,
        RequestStatus::Cancelled,
        RequestStatus::InProgress,
    ] {
        let store = Arc::clone(&store);
        let seen_at = seen.updated_at.clone();
        handles.push(tokio::spawn(async move {
            store
                .update_request(
                    "r1",
                    &RowScope::All,
                    RequestUpdate::new(RequestChange::Status {
                        to: target,
                        policy: TransitionPolicy::Strict,
                    })
                    .if_unchanged_since(seen_at),
                )
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(ConciergeError::Conflict { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(successes, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sends_are_all_listed_in_order() {
    let (store, _dir) = store().await;
    store.insert_request(&request("r1")).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            store
                .insert_message(&NewMessage {
                    id: format!("m{i}"),
                    request_id: "r1".into(),
                    sender_id: "p1".into(),
                    sender_type: SenderType::Player,
                    content: format!("message {i}"),
                    require_open: true,
                })
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let listed = store.list_messages("r1").await.unwrap();
    assert_eq!(listed.len(), 16);
    assert!(listed.windows(2).all(|w| w[0].created_at <= w[1].created_at));
    assert_eq!(
        store.count_unread("r1", SenderType::Player).await.unwrap(),
        16
    );
}

#[tokio::test]
async fn status_check_constraint_rejects_unknown_values() {
    let (store, _dir) = store().await;
    store.insert_request(&request("r1")).await.unwrap();

    let err = store
        .database()
        .unwrap()
        .connection()
        .call(|conn| {
            conn.execute("UPDATE requests SET status = 'archived' WHERE id = 'r1'", [])
        })
        .await
        .map_err(|e| e.to_string())
        .unwrap_err();
    assert!(err.to_lowercase().contains("check"), "{err}");
}
