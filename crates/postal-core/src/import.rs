#![cfg(feature = "runtime")]

use serde::Serialize;
use tokio::task;
use tracing::info;
use uuid::Uuid;

use crate::batch::{failure_message, resolve_batch};
use crate::db::DbPool;
use crate::error::{ImportError, Result};
use crate::reference::ReferenceMaps;
use crate::store;

/// One import call: a spreadsheet plus its submission metadata.
#[derive(Debug)]
pub struct ImportRequest {
    pub file_name: String,
    pub contents: Vec<u8>,
    pub dry_run: bool,
}

/// Per-call report returned to the caller and stored in `import_runs`.
/// Warning and error strings are ordered by ascending row number.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReceipt {
    pub import_id: Option<Uuid>,
    pub file_name: String,
    pub dry_run: bool,
    pub rows_read: usize,
    pub prepared: usize,
    pub saved: u64,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

const IMPORT_LOCK_KEY: i64 = 0x504F5354414C; // "POSTAL"

/// Runs one bulk import end to end under an exclusive advisory lock, so
/// two concurrent calls can never interleave their save operations.
pub async fn execute_import(pool: &DbPool, request: ImportRequest) -> Result<ImportReceipt> {
    let lock = AdvisoryLock::acquire(pool, IMPORT_LOCK_KEY).await?;
    let result = execute_import_locked(pool, request).await;
    lock.release().await?;
    result
}

async fn execute_import_locked(pool: &DbPool, request: ImportRequest) -> Result<ImportReceipt> {
    let ImportRequest {
        file_name,
        contents,
        dry_run,
    } = request;

    let rows = postal_sheet::read_rows(&contents)?;

    // Lookup tables are rebuilt on every call; a load failure aborts
    // before any row is processed.
    let maps = ReferenceMaps::load(pool).await?;

    let batch = resolve_batch(&rows, &maps);
    info!(
        file = %file_name,
        rows = rows.len(),
        prepared = batch.offices.len(),
        warnings = batch.warnings.len(),
        errors = batch.errors.len(),
        "resolved import batch"
    );

    let import_id = if dry_run { None } else { Some(Uuid::new_v4()) };

    let mut saved = 0u64;
    if !dry_run && !batch.offices.is_empty() {
        match store::save_all(pool, &batch.offices).await {
            Ok(count) => saved = count,
            Err(err) => {
                // Zero persistence of a batch the caller believed was
                // ready; never downgraded to a warning.
                if let Some(id) = import_id {
                    let receipt = build_receipt(import_id, &file_name, dry_run, rows.len(), &batch, 0);
                    store::record_run(pool, id, &file_name, "REJECTED", &serde_json::to_value(&receipt)?)
                        .await?;
                }
                return Err(ImportError::Storage(err.to_string()));
            }
        }
    }

    let receipt = build_receipt(import_id, &file_name, dry_run, rows.len(), &batch, saved);

    // The save has already been attempted: row errors still fail the
    // call as a whole, and the embedded prepared count tells the caller
    // the committed batch may be smaller than the original row count.
    if !batch.errors.is_empty() {
        if let Some(id) = import_id {
            store::record_run(pool, id, &file_name, "REJECTED", &serde_json::to_value(&receipt)?)
                .await?;
        }
        return Err(ImportError::BatchFailed {
            errors: batch.errors.len(),
            prepared: batch.offices.len(),
            message: failure_message(&batch.errors, batch.offices.len()),
        });
    }

    if let Some(id) = import_id {
        store::record_run(pool, id, &file_name, "ACCEPTED", &serde_json::to_value(&receipt)?)
            .await?;
    }

    Ok(receipt)
}

fn build_receipt(
    import_id: Option<Uuid>,
    file_name: &str,
    dry_run: bool,
    rows_read: usize,
    batch: &crate::batch::BatchResult,
    saved: u64,
) -> ImportReceipt {
    ImportReceipt {
        import_id,
        file_name: file_name.to_string(),
        dry_run,
        rows_read,
        prepared: batch.offices.len(),
        saved,
        warnings: batch.warnings.clone(),
        errors: batch.errors.clone(),
    }
}

struct AdvisoryLock {
    conn: Option<sqlx::pool::PoolConnection<sqlx::Postgres>>,
    key: i64,
}

impl AdvisoryLock {
    async fn acquire(pool: &DbPool, key: i64) -> Result<Self> {
        let mut conn = pool.acquire().await?;
        sqlx::query::<sqlx::Postgres>("SELECT pg_advisory_lock($1)")
            .bind(key)
            .execute(conn.as_mut())
            .await?;
        Ok(Self {
            conn: Some(conn),
            key,
        })
    }

    async fn release(mut self) -> Result<()> {
        if let Some(mut conn) = self.conn.take() {
            sqlx::query::<sqlx::Postgres>("SELECT pg_advisory_unlock($1)")
                .bind(self.key)
                .execute(conn.as_mut())
                .await?;
        }
        Ok(())
    }
}

impl Drop for AdvisoryLock {
    fn drop(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            let key = self.key;
            task::spawn(async move {
                if let Err(err) = sqlx::query::<sqlx::Postgres>("SELECT pg_advisory_unlock($1)")
                    .bind(key)
                    .execute(conn.as_mut())
                    .await
                {
                    tracing::warn!("failed to release advisory lock in drop: {err}");
                }
            });
        }
    }
}
