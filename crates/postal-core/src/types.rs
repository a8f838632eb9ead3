use serde::Serialize;

/// Organizational grouping distinct from the geographic hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Area {
    pub id: i32,
    pub name: String,
}

/// A barangay with its city/province/region ascendants pre-joined into a
/// flat row at load time. Each hop may be absent when the reference data
/// is incomplete.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BarangayChain {
    pub barangay_id: i32,
    pub name: String,
    pub city_municipality_id: Option<i32>,
    pub province_id: Option<i32>,
    pub region_id: Option<i32>,
}

/// A postal-office record ready for persistence. Never mutated after the
/// resolver produces it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedOffice {
    pub name: Option<String>,
    pub area_id: Option<i32>,
    pub region_id: Option<i32>,
    pub province_id: Option<i32>,
    pub city_municipality_id: Option<i32>,
    pub barangay_id: Option<i32>,
    pub zip_code: Option<String>,
    pub address: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub connected: bool,
}
