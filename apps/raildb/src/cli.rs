//! # Command Line Interface
//!
//! `raildb [--db <path>] [--json] <command>`
//!
//! Every command opens the store itself; nothing is shared between
//! invocations except the database file.

use crate::api;
use crate::config::Config;
use clap::{Parser, Subcommand};
use raildb_core::analytics::{self, AnalysisReport};
use raildb_core::formats::{ImportReport, parse_import};
use raildb_core::fragility::compute_fragility;
use raildb_core::{DEFAULT_DAMAGE_STATE, GradeStore};
use std::error::Error;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use tracing::info;

pub type CliResult<T = ()> = Result<T, Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "raildb", version, about = "Student grades and fragility curve service")]
pub struct Cli {
    /// Database file (overrides RAILDB_DB_PATH)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create an empty grade store
    Init {
        /// Replace an existing database
        #[arg(long)]
        force: bool,
    },

    /// Import a grade payload (JSON array or JavaScript declaration)
    Import {
        /// Payload file
        file: PathBuf,
    },

    /// Print the grade analysis report
    Summary {
        /// Year of the per-test breakdown (defaults to the latest year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Evaluate a fragility curve
    Fragility {
        /// Peak ground acceleration
        #[arg(long, allow_negative_numbers = true)]
        pga: f64,

        /// Median PGA capacity of the damage state
        #[arg(long, allow_negative_numbers = true)]
        pga_mean: f64,

        /// Log standard deviation
        #[arg(long, allow_negative_numbers = true)]
        beta: f64,

        /// Damage state label
        #[arg(long, default_value = DEFAULT_DAMAGE_STATE)]
        damage_state: String,
    },

    /// Run the HTTP API
    Serve {
        /// Bind host (overrides RAILDB_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Requests per second (overrides RAILDB_RATE_LIMIT)
        #[arg(long)]
        rate_limit: Option<NonZeroU32>,
    },
}

/// Dispatch a parsed command line, reading settings through `env`.
///
/// The full [`Config`] is only parsed for `serve`.
pub async fn run(cli: Cli, env: impl Fn(&str) -> Option<String>) -> CliResult {
    let db_path = match cli.db {
        Some(db) => db,
        None => Config::db_path_from_lookup(&env),
    };

    match cli.command {
        Commands::Init { force } => cmd_init(&db_path, force),
        Commands::Import { file } => cmd_import(&db_path, cli.json, &file).map(|_| ()),
        Commands::Summary { year } => cmd_summary(&db_path, cli.json, year).map(|_| ()),
        Commands::Fragility {
            pga,
            pga_mean,
            beta,
            damage_state,
        } => cmd_fragility(cli.json, pga, pga_mean, beta, &damage_state),
        Commands::Serve {
            host,
            port,
            rate_limit,
        } => {
            let mut config = Config::from_lookup(&env)?;
            config.db_path = db_path;
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(rate_limit) = rate_limit {
                config.rate_limit = rate_limit;
            }
            cmd_serve(&config).await
        }
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Create an empty store at `db_path`.
pub fn cmd_init(db_path: &Path, force: bool) -> CliResult {
    if db_path.exists() {
        if !force {
            return Err(format!(
                "database already exists at {} (use --force to replace it)",
                db_path.display()
            )
            .into());
        }
        std::fs::remove_file(db_path)?;
        info!(path = %db_path.display(), "Removed existing database");
    }

    GradeStore::open(db_path)?;
    info!(path = %db_path.display(), "Initialized database");
    println!("Initialized empty grade store at {}", db_path.display());
    Ok(())
}

/// Import a payload file, upserting every record.
pub fn cmd_import(db_path: &Path, json: bool, file: &Path) -> CliResult<ImportReport> {
    let content = std::fs::read_to_string(file)?;
    let grades = parse_import(&content)?;
    info!(file = %file.display(), records = grades.len(), "Parsed import payload");

    let store = GradeStore::open(db_path)?;
    let mut report = ImportReport::default();
    for grade in &grades {
        report.record(store.upsert(grade)?.created);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Data import completed");
        println!("  New records inserted:    {}", report.inserted);
        println!("  Records updated:         {}", report.updated);
        println!("  Total records processed: {}", report.total);
    }
    Ok(report)
}

/// Print the analysis report: summary, top students, per-year and
/// per-test statistics, histogram, perfect scores and one year's tests.
pub fn cmd_summary(
    db_path: &Path,
    json: bool,
    year: Option<i32>,
) -> CliResult<Option<AnalysisReport>> {
    let store = GradeStore::open(db_path)?;
    let records = store.all()?;

    let Some(report) = analytics::analysis_report(&records, year) else {
        if json {
            println!("null");
        } else {
            println!("No grade records found");
        }
        return Ok(None);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(Some(report))
}

/// Evaluate one fragility curve.
pub fn cmd_fragility(
    json: bool,
    pga: f64,
    pga_mean: f64,
    beta: f64,
    damage_state: &str,
) -> CliResult {
    let report = compute_fragility(pga, pga_mean, beta, Some(damage_state))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.derivation);
        for (symbol, meaning) in &report.variables {
            println!("  {symbol}: {meaning}");
        }
    }
    Ok(())
}

/// Run the HTTP API until shutdown.
pub async fn cmd_serve(config: &Config) -> CliResult {
    let store = GradeStore::open(&config.db_path)?;
    api::serve(config, store).await?;
    Ok(())
}
