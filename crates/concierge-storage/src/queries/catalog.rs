// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Category and service lookups.
//!
//! The catalog is managed by another part of the platform; the inserts here
//! exist for seeding fixtures and local setups.

use concierge_core::{Category, ConciergeError, Service};
use rusqlite::{OptionalExtension, Row, params};

use crate::database::{Database, TxError, map_tr_err};

const CATEGORY_COLUMNS: &str = "id, slug, name_fr, icon, display_order, is_active, created_at";
const SERVICE_COLUMNS: &str =
    "id, category_id, slug, name_fr, description_fr, display_order, is_active, created_at";

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        slug: row.get(1)?,
        name_fr: row.get(2)?,
        icon: row.get(3)?,
        display_order: row.get(4)?,
        is_active: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn service_from_row(row: &Row<'_>) -> rusqlite::Result<Service> {
    Ok(Service {
        id: row.get(0)?,
        category_id: row.get(1)?,
        slug: row.get(2)?,
        name_fr: row.get(3)?,
        description_fr: row.get(4)?,
        display_order: row.get(5)?,
        is_active: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Look a category up by id or slug.
pub async fn find_category(db: &Database, key: &str) -> Result<Option<Category>, ConciergeError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<_, TxError> {
            Ok(conn
                .query_row(
                    &format!(
                        "SELECT {CATEGORY_COLUMNS} FROM categories
                         WHERE id = ?1 OR slug = ?1 ORDER BY id = ?1 DESC LIMIT 1"
                    ),
                    params![key],
                    category_from_row,
                )
                .optional()?)
        })
        .await
        .map_err(map_tr_err)
}

/// Look a service up by id or slug.
pub async fn find_service(db: &Database, key: &str) -> Result<Option<Service>, ConciergeError> {
    let key = key.to_string();
    db.connection()
        .call(move |conn| -> Result<_, TxError> {
            Ok(conn
                .query_row(
                    &format!(
                        "SELECT {SERVICE_COLUMNS} FROM services
                         WHERE id = ?1 OR slug = ?1 ORDER BY id = ?1 DESC LIMIT 1"
                    ),
                    params![key],
                    service_from_row,
                )
                .optional()?)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn active_categories(db: &Database) -> Result<Vec<Category>, ConciergeError> {
    db.connection()
        .call(|conn| -> Result<_, TxError> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM categories
                 WHERE is_active = 1 ORDER BY display_order, name_fr"
            ))?;
            let rows = stmt
                .query_map([], category_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn active_services(
    db: &Database,
    category_id: &str,
) -> Result<Vec<Service>, ConciergeError> {
    let category_id = category_id.to_string();
    db.connection()
        .call(move |conn| -> Result<_, TxError> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SERVICE_COLUMNS} FROM services
                 WHERE category_id = ?1 AND is_active = 1 ORDER BY display_order, name_fr"
            ))?;
            let rows = stmt
                .query_map(params![category_id], service_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
        .map_err(map_tr_err)
}

pub async fn insert_category(db: &Database, category: &Category) -> Result<(), ConciergeError> {
    let c = category.clone();
    db.connection()
        .call(move |conn| -> Result<(), TxError> {
            conn.execute(
                &format!(
                    "INSERT INTO categories ({CATEGORY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                ),
                params![
                    c.id,
                    c.slug,
                    c.name_fr,
                    c.icon,
                    c.display_order,
                    c.is_active,
                    c.created_at
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn insert_service(db: &Database, service: &Service) -> Result<(), ConciergeError> {
    let s = service.clone();
    db.connection()
        .call(move |conn| -> Result<(), TxError> {
            conn.execute(
                &format!(
                    "INSERT INTO services ({SERVICE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                params![
                    s.id,
                    s.category_id,
                    s.slug,
                    s.name_fr,
                    s.description_fr,
                    s.display_order,
                    s.is_active,
                    s.created_at
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{CATEGORY_ID, SERVICE_ID, open_seeded};

    #[tokio::test]
    async fn lookup_by_id_or_slug() {
        let (db, _dir) = open_seeded().await;
        let by_slug = find_category(&db, "administratif").await.unwrap().unwrap();
        let by_id = find_category(&db, CATEGORY_ID).await.unwrap().unwrap();
        assert_eq!(by_slug, by_id);

        let service = find_service(&db, "passport-renewal").await.unwrap().unwrap();
        assert_eq!(service.id, SERVICE_ID);
        assert_eq!(service.category_id, CATEGORY_ID);
        assert!(find_service(&db, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn inactive_rows_are_not_listed() {
        let (db, _dir) = open_seeded().await;
        let categories = active_categories(&db).await.unwrap();
        assert!(categories.iter().all(|c| c.is_active));
        assert!(categories.iter().any(|c| c.slug == "administratif"));

        let services = active_services(&db, CATEGORY_ID).await.unwrap();
        assert_eq!(
            services.iter().map(|s| s.slug.as_str()).collect::<Vec<_>>(),
            ["passport-renewal"]
        );
    }
}
