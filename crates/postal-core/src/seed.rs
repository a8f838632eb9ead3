use std::path::Path;

use csv::StringRecord;
use tracing::info;

use crate::db::DbPool;
use crate::error::Result;

/// Organizational areas are a small fixed set; everything else comes
/// from CSV exports of the reference tables.
static AREA_SEEDS: &[&str] = &[
    "Area 1", "Area 2", "Area 3", "Area 4", "Area 5", "Area 6", "Area 7", "Area 8",
];

pub async fn run(pool: &DbPool) -> Result<()> {
    seed_areas(pool).await
}

async fn seed_areas(pool: &DbPool) -> Result<()> {
    for name in AREA_SEEDS {
        let result = sqlx::query::<sqlx::Postgres>(
            "INSERT INTO areas (name) VALUES ($1) ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            info!(name, "Seeded area");
        }
    }
    Ok(())
}

/// Row counts loaded per reference table by `load_reference_dir`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SeedReport {
    pub regions: u64,
    pub provinces: u64,
    pub city_municipalities: u64,
    pub barangays: u64,
    pub zip_codes: u64,
}

/// Loads the geographic hierarchy and zip-code table from CSV files in
/// `dir`. Missing files are skipped so a partial refresh is possible.
/// Parents are resolved by name, so the tables load in hierarchy order:
/// regions, provinces, cities/municipalities, barangays, zip codes.
pub async fn load_reference_dir(pool: &DbPool, dir: &Path) -> Result<SeedReport> {
    let report = SeedReport {
        regions: load_regions(pool, &dir.join("regions.csv")).await?,
        provinces: load_provinces(pool, &dir.join("provinces.csv")).await?,
        city_municipalities: load_city_municipalities(pool, &dir.join("city_municipalities.csv"))
            .await?,
        barangays: load_barangays(pool, &dir.join("barangays.csv")).await?,
        zip_codes: load_zip_codes(pool, &dir.join("zip_codes.csv")).await?,
    };

    info!(
        regions = report.regions,
        provinces = report.provinces,
        city_municipalities = report.city_municipalities,
        barangays = report.barangays,
        zip_codes = report.zip_codes,
        "Seeded reference data"
    );

    Ok(report)
}

fn read_records(path: &Path) -> Result<Vec<StringRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for record in reader.records() {
        records.push(record?);
    }
    Ok(records)
}

fn field(record: &StringRecord, index: usize) -> Option<&str> {
    record
        .get(index)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

async fn load_regions(pool: &DbPool, path: &Path) -> Result<u64> {
    let mut loaded = 0u64;
    for record in read_records(path)? {
        let Some(name) = field(&record, 0) else {
            continue;
        };
        let result = sqlx::query::<sqlx::Postgres>(
            "INSERT INTO regions (name) VALUES ($1) ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .execute(pool)
        .await?;
        loaded += result.rows_affected();
    }
    Ok(loaded)
}

async fn load_provinces(pool: &DbPool, path: &Path) -> Result<u64> {
    let mut loaded = 0u64;
    for record in read_records(path)? {
        let Some(name) = field(&record, 0) else {
            continue;
        };
        let result = sqlx::query::<sqlx::Postgres>(
            r#"
            INSERT INTO provinces (name, region_id)
            VALUES ($1, (SELECT id FROM regions WHERE name = $2))
            ON CONFLICT (name) DO UPDATE SET region_id = EXCLUDED.region_id
            "#,
        )
        .bind(name)
        .bind(field(&record, 1))
        .execute(pool)
        .await?;
        loaded += result.rows_affected();
    }
    Ok(loaded)
}

async fn load_city_municipalities(pool: &DbPool, path: &Path) -> Result<u64> {
    let mut loaded = 0u64;
    for record in read_records(path)? {
        let Some(name) = field(&record, 0) else {
            continue;
        };
        let result = sqlx::query::<sqlx::Postgres>(
            r#"
            INSERT INTO city_municipalities (name, province_id)
            VALUES ($1, (SELECT id FROM provinces WHERE name = $2))
            ON CONFLICT (name) DO UPDATE SET province_id = EXCLUDED.province_id
            "#,
        )
        .bind(name)
        .bind(field(&record, 1))
        .execute(pool)
        .await?;
        loaded += result.rows_affected();
    }
    Ok(loaded)
}

async fn load_barangays(pool: &DbPool, path: &Path) -> Result<u64> {
    let mut loaded = 0u64;
    for record in read_records(path)? {
        let Some(name) = field(&record, 0) else {
            continue;
        };
        let result = sqlx::query::<sqlx::Postgres>(
            r#"
            INSERT INTO barangays (name, city_municipality_id)
            VALUES ($1, (SELECT id FROM city_municipalities WHERE name = $2))
            ON CONFLICT (name) DO UPDATE SET city_municipality_id = EXCLUDED.city_municipality_id
            "#,
        )
        .bind(name)
        .bind(field(&record, 1))
        .execute(pool)
        .await?;
        loaded += result.rows_affected();
    }
    Ok(loaded)
}

async fn load_zip_codes(pool: &DbPool, path: &Path) -> Result<u64> {
    let mut loaded = 0u64;
    for record in read_records(path)? {
        let (Some(zip_code), Some(barangay_name)) = (field(&record, 0), field(&record, 1)) else {
            continue;
        };
        let result = sqlx::query::<sqlx::Postgres>(
            r#"
            INSERT INTO zip_codes (zip_code, barangay_name)
            VALUES ($1, $2)
            ON CONFLICT (zip_code) DO UPDATE SET barangay_name = EXCLUDED.barangay_name
            "#,
        )
        .bind(zip_code)
        .bind(barangay_name)
        .execute(pool)
        .await?;
        loaded += result.rows_affected();
    }
    Ok(loaded)
}
