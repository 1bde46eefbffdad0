// SPDX-FileCopyrightText: 2026 Concierge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reference catalog rows.

use concierge_core::{Category, ConciergeError, Service};
use concierge_storage::SqliteStore;

pub const ADMINISTRATIF: &str = "administratif";
pub const PASSPORT_RENEWAL: &str = "passport-renewal";
pub const PASSPORT_TITLE: &str = "Renouvellement de passeport";
pub const VOYAGE: &str = "voyage";
pub const FLIGHT_BOOKING: &str = "flight-booking";
/// Inactive service under [`ADMINISTRATIF`].
pub const RETIRED_SERVICE: &str = "fax";

const SEEDED_AT: &str = "2026-01-01T00:00:00.000Z";

fn category(slug: &str, name: &str, icon: &str, order: i64) -> Category {
    Category {
        id: format!("cat-{slug}"),
        slug: slug.to_string(),
        name_fr: name.to_string(),
        icon: icon.to_string(),
        display_order: order,
        is_active: true,
        created_at: SEEDED_AT.to_string(),
    }
}

fn service(category: &str, slug: &str, name: &str, order: i64, active: bool) -> Service {
    Service {
        id: format!("svc-{slug}"),
        category_id: format!("cat-{category}"),
        slug: slug.to_string(),
        name_fr: name.to_string(),
        description_fr: None,
        display_order: order,
        is_active: active,
        created_at: SEEDED_AT.to_string(),
    }
}

pub fn categories() -> Vec<Category> {
    vec![
        category(ADMINISTRATIF, "Administratif", "file-text", 1),
        category(VOYAGE, "Voyage", "plane", 2),
    ]
}

pub fn services() -> Vec<Service> {
    vec![
        service(ADMINISTRATIF, PASSPORT_RENEWAL, PASSPORT_TITLE, 1, true),
        service(ADMINISTRATIF, RETIRED_SERVICE, "Télécopie", 2, false),
        service(VOYAGE, FLIGHT_BOOKING, "Réservation de vol", 1, true),
    ]
}

/// Insert [`categories`] and [`services`].
pub async fn seed(store: &SqliteStore) -> Result<(), ConciergeError> {
    for category in categories() {
        store.insert_category(&category).await?;
    }
    for service in services() {
        store.insert_service(&service).await?;
    }
    Ok(())
}
