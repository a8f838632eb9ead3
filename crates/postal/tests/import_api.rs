use std::env;
use std::path::Path;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use postal_core::import::{execute_import, ImportRequest};
use postal_core::{db, seed};
use sqlx::Row;
use tokio::runtime::Runtime;
use tower::ServiceExt;

fn fixture(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../postal-sheet/tests/data")
        .join(name);
    std::fs::read(path).expect("read fixture")
}

fn multipart_body(boundary: &str, file_name: &str, contents: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/vnd.openxmlformats-officedocument.spreadsheetml.sheet\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

#[test]
fn import_endpoint_roundtrip() -> Result<()> {
    let database_url = match env::var("POSTAL_TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping import API integration test because POSTAL_TEST_DATABASE_URL is not set"
            );
            return Ok(());
        }
    };

    let rt = Runtime::new()?;
    rt.block_on(async move {
        let pool = db::connect(&database_url).await?;
        db::run_migrations(&pool).await?;
        seed::run(&pool).await?;

        sqlx::query(
            "TRUNCATE TABLE postal_offices, import_runs, zip_codes, barangays, city_municipalities, provinces, regions CASCADE",
        )
        .execute(&pool)
        .await?;

        let region_id: i32 = sqlx::query_scalar(
            "INSERT INTO regions (name) VALUES ('National Capital Region') RETURNING id",
        )
        .fetch_one(&pool)
        .await?;
        let province_id: i32 = sqlx::query_scalar(
            "INSERT INTO provinces (name, region_id) VALUES ('Metro Manila', $1) RETURNING id",
        )
        .bind(region_id)
        .fetch_one(&pool)
        .await?;
        let city_id: i32 = sqlx::query_scalar(
            "INSERT INTO city_municipalities (name, province_id) VALUES ('Manila', $1) RETURNING id",
        )
        .bind(province_id)
        .fetch_one(&pool)
        .await?;
        sqlx::query("INSERT INTO barangays (name, city_municipality_id) VALUES ('Intramuros', $1)")
            .bind(city_id)
            .execute(&pool)
            .await?;
        sqlx::query("INSERT INTO zip_codes (zip_code, barangay_name) VALUES ('1000', 'Intramuros')")
            .execute(&pool)
            .await?;

        let app = postal::server::router(pool.clone());
        let contents = fixture("postal_offices.xlsx");

        let boundary = "postal-test-boundary";
        let request = Request::builder()
            .method("POST")
            .uri("/api/postal-offices/import")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(multipart_body(boundary, "postal_offices.xlsx", &contents)))?;

        let response = app.clone().oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await?.to_bytes();
        let payload: serde_json::Value = serde_json::from_slice(&bytes)?;
        assert_eq!(payload["success"], serde_json::Value::Bool(true));

        let receipt = &payload["receipt"];
        assert_eq!(receipt["rows_read"], 3);
        assert_eq!(receipt["prepared"], 3);
        assert_eq!(receipt["saved"], 3);
        assert_eq!(receipt["errors"].as_array().map(Vec::len), Some(0));
        // blank row 3 and the unknown-area/bad-longitude row 4
        assert_eq!(receipt["warnings"].as_array().map(Vec::len), Some(4));

        let saved_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM postal_offices")
            .fetch_one(&pool)
            .await?;
        assert_eq!(saved_count, 3);

        let manila = sqlx::query(
            "SELECT area_id, region_id, barangay_id, zip_code, connected FROM postal_offices WHERE name = 'Manila Central Post Office'",
        )
        .fetch_one(&pool)
        .await?;
        assert!(manila.try_get::<Option<i32>, _>("area_id")?.is_some());
        assert_eq!(manila.try_get::<Option<i32>, _>("region_id")?, Some(region_id));
        assert!(manila.try_get::<Option<i32>, _>("barangay_id")?.is_some());
        assert_eq!(manila.try_get::<Option<String>, _>("zip_code")?.as_deref(), Some("1000"));
        assert!(manila.try_get::<bool, _>("connected")?);

        let outcome: String = sqlx::query_scalar("SELECT outcome FROM import_runs")
            .fetch_one(&pool)
            .await?;
        assert_eq!(outcome, "ACCEPTED");

        // a dry run resolves identically but persists nothing
        let dry = execute_import(
            &pool,
            ImportRequest {
                file_name: "postal_offices.xlsx".into(),
                contents: contents.clone(),
                dry_run: true,
            },
        )
        .await?;
        assert!(dry.dry_run);
        assert_eq!(dry.prepared, 3);
        assert_eq!(dry.saved, 0);
        assert_eq!(dry.warnings.len(), 4);

        let runs: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM import_runs")
            .fetch_one(&pool)
            .await?;
        assert_eq!(runs, 1);

        let offices: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM postal_offices")
            .fetch_one(&pool)
            .await?;
        assert_eq!(offices, 3);

        // a sheet with an error cell fails the call but still commits
        // the rows that did prepare
        sqlx::query("TRUNCATE TABLE postal_offices, import_runs CASCADE")
            .execute(&pool)
            .await?;

        let broken = fixture("postal_offices_error_cell.xlsx");
        let request = Request::builder()
            .method("POST")
            .uri("/api/postal-offices/import")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(multipart_body(
                boundary,
                "postal_offices_error_cell.xlsx",
                &broken,
            )))?;

        let response = app.oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = response.into_body().collect().await?.to_bytes();
        let payload: serde_json::Value = serde_json::from_slice(&bytes)?;
        assert_eq!(payload["success"], serde_json::Value::Bool(false));
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.contains("Import failed with 1 errors."), "{message}");
        assert!(
            message.contains("1 records were imported successfully."),
            "{message}"
        );

        let offices: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM postal_offices")
            .fetch_one(&pool)
            .await?;
        assert_eq!(offices, 1);

        let outcome: String = sqlx::query_scalar("SELECT outcome FROM import_runs")
            .fetch_one(&pool)
            .await?;
        assert_eq!(outcome, "REJECTED");

        Ok::<_, anyhow::Error>(())
    })?;

    Ok(())
}

