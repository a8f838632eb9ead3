use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::DbPool;
use crate::error::Result;
use crate::types::ResolvedOffice;

/// Bulk-saves the prepared records inside a single database transaction:
/// either every record commits or none do. Returns the saved count.
///
/// Errors are left as raw `sqlx::Error` so the coordinator can surface
/// them as a storage failure rather than a row failure.
pub async fn save_all(
    pool: &DbPool,
    offices: &[ResolvedOffice],
) -> std::result::Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut saved = 0u64;

    for office in offices {
        let result = sqlx::query(
            r#"
            INSERT INTO postal_offices (
                name,
                area_id,
                region_id,
                province_id,
                city_municipality_id,
                barangay_id,
                zip_code,
                address,
                longitude,
                latitude,
                connected
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(&office.name)
        .bind(office.area_id)
        .bind(office.region_id)
        .bind(office.province_id)
        .bind(office.city_municipality_id)
        .bind(office.barangay_id)
        .bind(&office.zip_code)
        .bind(&office.address)
        .bind(office.longitude)
        .bind(office.latitude)
        .bind(office.connected)
        .execute(&mut *tx)
        .await?;

        saved += result.rows_affected();
    }

    tx.commit().await?;
    Ok(saved)
}

/// Records the outcome of one import call for later inspection.
pub async fn record_run(
    pool: &DbPool,
    import_id: Uuid,
    file_name: &str,
    outcome: &str,
    receipt: &serde_json::Value,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO import_runs (import_id, file_name, outcome, receipt)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (import_id)
        DO UPDATE SET outcome = EXCLUDED.outcome, receipt = EXCLUDED.receipt
        "#,
    )
    .bind(import_id)
    .bind(file_name)
    .bind(outcome)
    .bind(receipt)
    .execute(pool)
    .await?;
    Ok(())
}

#[derive(Debug, sqlx::FromRow)]
pub struct ImportRunSummary {
    pub import_id: Uuid,
    pub file_name: String,
    pub outcome: String,
    pub created_at: DateTime<Utc>,
}

/// Most recent import runs, newest first.
pub async fn recent_runs(pool: &DbPool, limit: i64) -> Result<Vec<ImportRunSummary>> {
    let runs = sqlx::query_as::<_, ImportRunSummary>(
        r#"
        SELECT import_id, file_name, outcome, created_at
        FROM import_runs
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(runs)
}
