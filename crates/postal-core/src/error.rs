use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("database migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("failed to read spreadsheet: {0}")]
    Sheet(#[from] postal_sheet::SheetError),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("seed file error: {0}")]
    Csv(#[from] csv::Error),

    #[error("receipt serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The bulk save itself failed. Distinct from row failures: it means
    /// zero persistence of a batch the caller believed was ready.
    #[error("Failed to save records to database: {0}")]
    Storage(String),

    /// One or more rows failed during processing. The prepared records
    /// were still committed; `message` carries the composite report.
    #[error("{message}")]
    BatchFailed {
        errors: usize,
        prepared: usize,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, ImportError>;
