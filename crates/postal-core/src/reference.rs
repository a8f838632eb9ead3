use std::collections::HashMap;

use crate::db::DbPool;
use crate::error::Result;
use crate::types::{Area, BarangayChain};

/// In-memory lookup tables consulted while resolving import rows.
/// Built fresh from the reference tables at the start of each import and
/// read-only for the duration of the call.
#[derive(Debug, Default)]
pub struct ReferenceMaps {
    area_by_name: HashMap<String, Area>,
    barangay_by_name: HashMap<String, BarangayChain>,
    barangay_name_by_zip: HashMap<String, String>,
}

impl ReferenceMaps {
    pub fn new(
        areas: Vec<Area>,
        barangays: Vec<BarangayChain>,
        zip_codes: Vec<(String, String)>,
    ) -> Self {
        Self {
            area_by_name: areas
                .into_iter()
                .map(|area| (area.name.clone(), area))
                .collect(),
            barangay_by_name: barangays
                .into_iter()
                .map(|barangay| (barangay.name.clone(), barangay))
                .collect(),
            barangay_name_by_zip: zip_codes.into_iter().collect(),
        }
    }

    /// Loads all three lookup tables. Any failure here aborts the import
    /// before a single row is processed.
    pub async fn load(pool: &DbPool) -> Result<Self> {
        let areas = sqlx::query_as::<_, Area>("SELECT id, name FROM areas")
            .fetch_all(pool)
            .await?;

        // The ascendant chain is flattened once here so the resolver
        // never re-queries it.
        let barangays = sqlx::query_as::<_, BarangayChain>(
            r#"
            SELECT
                b.id AS barangay_id,
                b.name,
                cm.id AS city_municipality_id,
                p.id AS province_id,
                r.id AS region_id
            FROM barangays b
            LEFT JOIN city_municipalities cm ON cm.id = b.city_municipality_id
            LEFT JOIN provinces p ON p.id = cm.province_id
            LEFT JOIN regions r ON r.id = p.region_id
            "#,
        )
        .fetch_all(pool)
        .await?;

        let zip_codes = sqlx::query_as::<_, (String, String)>(
            "SELECT zip_code, barangay_name FROM zip_codes",
        )
        .fetch_all(pool)
        .await?;

        tracing::debug!(
            areas = areas.len(),
            barangays = barangays.len(),
            zip_codes = zip_codes.len(),
            "loaded reference maps"
        );

        Ok(Self::new(areas, barangays, zip_codes))
    }

    pub fn area(&self, name: &str) -> Option<&Area> {
        self.area_by_name.get(name)
    }

    pub fn barangay(&self, name: &str) -> Option<&BarangayChain> {
        self.barangay_by_name.get(name)
    }

    pub fn barangay_name_for_zip(&self, zip_code: &str) -> Option<&str> {
        self.barangay_name_by_zip.get(zip_code).map(String::as_str)
    }
}
