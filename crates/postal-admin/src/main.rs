use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use postal_core::{db, seed, store};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Postal office administrative tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed reference data into the database
    DbSeed(DbSeedArgs),
    /// List recently recorded import runs
    ImportRuns(ImportRunsArgs),
}

#[derive(Args, Debug, Default)]
struct DbSeedArgs {
    /// Skip running embedded database migrations before seeding
    #[arg(long)]
    skip_migrations: bool,
    /// Directory holding reference-data CSV exports
    #[arg(long)]
    reference_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ImportRunsArgs {
    /// Maximum number of runs to show
    #[arg(long, default_value_t = 20)]
    limit: i64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::DbSeed(args) => handle_db_seed(args).await,
        Command::ImportRuns(args) => handle_import_runs(args).await,
    }
}

async fn handle_db_seed(args: DbSeedArgs) -> Result<()> {
    let pool = connect_pool().await?;

    if args.skip_migrations {
        info!("Skipping migrations at user request");
    } else {
        db::run_migrations(&pool).await?;
    }

    seed::run(&pool).await?;

    if let Some(dir) = args.reference_dir {
        let report = seed::load_reference_dir(&pool, &dir).await?;
        println!(
            "Loaded {} regions, {} provinces, {} cities/municipalities, {} barangays, {} zip codes.",
            report.regions,
            report.provinces,
            report.city_municipalities,
            report.barangays,
            report.zip_codes
        );
    }

    Ok(())
}

async fn handle_import_runs(args: ImportRunsArgs) -> Result<()> {
    let pool = connect_pool().await?;
    let runs = store::recent_runs(&pool, args.limit).await?;

    if runs.is_empty() {
        println!("No import runs recorded yet.");
        return Ok(());
    }

    for run in runs {
        println!(
            "{}  {}  {}  {}",
            run.created_at, run.import_id, run.outcome, run.file_name
        );
    }

    Ok(())
}

async fn connect_pool() -> Result<db::DbPool> {
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .or_else(|_| env::var("POSTAL_DATABASE_URL"))
        .context("DATABASE_URL (or POSTAL_DATABASE_URL) must be set")?;

    Ok(db::connect(&database_url).await?)
}
