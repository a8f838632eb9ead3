use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use postal_core::{db, import, seed};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use postal::server;

#[derive(Parser, Debug)]
#[command(author, version, about = "Postal office records CLI and API server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the API server
    Serve(ServeArgs),
    /// Run database migrations
    Migrate,
    /// Seed reference data (optionally running migrations)
    DbSeed(DbSeedArgs),
    /// Import a postal-office spreadsheet
    Import(ImportArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to bind the HTTP listener to
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,
}

#[derive(Args, Debug, Default)]
struct DbSeedArgs {
    /// Skip running migrations before seeding
    #[arg(long)]
    skip_migrations: bool,
    /// Directory holding reference-data CSV exports
    #[arg(long)]
    reference_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// Spreadsheet file to import
    file: PathBuf,
    /// Resolve and validate without saving anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            let pool = connect_pool().await?;
            let app = server::router(pool);
            let listener = tokio::net::TcpListener::bind(&args.bind)
                .await
                .with_context(|| format!("failed to bind {}", args.bind))?;
            info!(bind = %args.bind, "Starting postal API server");
            axum::serve(listener, app).await?;
            Ok(())
        }
        Command::Migrate => {
            let pool = connect_pool().await?;
            db::run_migrations(&pool).await?;
            info!("Database migrations applied");
            Ok(())
        }
        Command::DbSeed(args) => {
            let pool = connect_pool().await?;
            if args.skip_migrations {
                warn!("Skipping migrations before seeding");
            } else {
                db::run_migrations(&pool).await?;
            }
            seed::run(&pool).await?;
            if let Some(dir) = args.reference_dir {
                seed::load_reference_dir(&pool, &dir).await?;
            }
            info!("Reference data seeded");
            Ok(())
        }
        Command::Import(args) => {
            let pool = connect_pool().await?;
            let contents = std::fs::read(&args.file)
                .with_context(|| format!("failed to read {}", args.file.display()))?;
            let file_name = args
                .file
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| args.file.display().to_string());

            let receipt = import::execute_import(
                &pool,
                import::ImportRequest {
                    file_name,
                    contents,
                    dry_run: args.dry_run,
                },
            )
            .await?;

            println!("{}", serde_json::to_string_pretty(&receipt)?);
            Ok(())
        }
    }
}

async fn connect_pool() -> Result<db::DbPool> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("POSTAL_DATABASE_URL"))
        .context("DATABASE_URL (or POSTAL_DATABASE_URL) must be set")?;
    Ok(db::connect(&database_url).await?)
}
