use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use postal_core::db::DbPool;
use postal_core::import::{execute_import, ImportReceipt, ImportRequest};
use serde::Serialize;
use tracing::error;

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
}

pub fn router(pool: DbPool) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/api/postal-offices/import", post(import_postal_offices))
        .with_state(AppState { pool })
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<ImportReceipt>,
}

impl ImportResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            receipt: None,
        }
    }
}

/// Multipart import endpoint: expects a `file` part holding the
/// spreadsheet and an optional `dry_run` text part.
async fn import_postal_offices(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> (StatusCode, Json<ImportResponse>) {
    let mut file_name: Option<String> = None;
    let mut contents: Option<Vec<u8>> = None;
    let mut dry_run = false;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ImportResponse::failure(format!(
                        "invalid multipart request: {err}"
                    ))),
                );
            }
        };

        match field.name() {
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                match field.bytes().await {
                    Ok(bytes) => contents = Some(bytes.to_vec()),
                    Err(err) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(ImportResponse::failure(format!(
                                "failed to read uploaded file: {err}"
                            ))),
                        );
                    }
                }
            }
            Some("dry_run") => {
                dry_run = matches!(field.text().await.as_deref(), Ok("true") | Ok("1"));
            }
            _ => {}
        }
    }

    let Some(contents) = contents else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ImportResponse::failure("Please select a file to upload")),
        );
    };

    let file_name = file_name.unwrap_or_else(|| "upload.xlsx".to_string());
    if !file_name.ends_with(".xlsx") && !file_name.ends_with(".xls") {
        return (
            StatusCode::BAD_REQUEST,
            Json(ImportResponse::failure(
                "Please upload a valid Excel file (.xlsx or .xls)",
            )),
        );
    }

    let request = ImportRequest {
        file_name,
        contents,
        dry_run,
    };

    match execute_import(&state.pool, request).await {
        Ok(receipt) => {
            let message = if receipt.warnings.is_empty() {
                format!("Postal offices imported successfully! {} records saved.", receipt.saved)
            } else {
                format!(
                    "Postal offices imported successfully! {} records saved, {} warnings.",
                    receipt.saved,
                    receipt.warnings.len()
                )
            };
            (
                StatusCode::OK,
                Json(ImportResponse {
                    success: true,
                    message,
                    receipt: Some(receipt),
                }),
            )
        }
        Err(err) => {
            error!("import failed: {err}");
            (
                StatusCode::BAD_REQUEST,
                Json(ImportResponse::failure(format!("Import failed: {err}"))),
            )
        }
    }
}
