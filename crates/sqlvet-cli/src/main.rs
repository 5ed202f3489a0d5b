//! sqlvet command-line interface.
//!
//! Validates ABAP SQL and Ariba AQL statements beyond what a permissive
//! parser accepts.
//!
//! # Quick Start
//!
//! ```bash
//! # Validate one statement (exit code 1 when invalid)
//! sqlvet check "SELECT carrid FROM sflight WHERE carrid = 'AA'"
//!
//! # Describe a statement as JSON
//! sqlvet --dialect aql analyze --json "SELECT cr FROM ariba.rfx.Document AS cr INCLUDE INACTIVE"
//!
//! # Validate every statement of some scripts
//! sqlvet batch queries/ legacy.sql
//! ```

mod commands;
mod style;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlvet::{Checker, ConfigLoader, Dialect};

/// sqlvet - semantic validation for ABAP SQL and Ariba AQL.
#[derive(Parser)]
#[command(name = "sqlvet")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// SQL dialect (abap, aql). Overrides the configured dialect.
    #[arg(short, long, global = true)]
    dialect: Option<Dialect>,

    /// Parse the text as written, without dialect preprocessing.
    #[arg(long, global = true)]
    no_preprocess: bool,

    /// Directory holding sqlvet.toml (default: current directory).
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Validate a single statement. Use "-" to read it from stdin.
    Check {
        /// SQL statement.
        sql: String,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Validate a statement and describe its tables, columns and clauses.
    Analyze {
        /// SQL statement. Use "-" to read it from stdin.
        sql: String,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Validate every statement of SQL scripts.
    Batch {
        /// Script files, or directories whose *.sql files are validated.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print the reports as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    style::set_no_color(cli.no_color);

    let valid = match &cli.command {
        Commands::Version => {
            commands::version::run();
            true
        }
        Commands::Check { sql, json } => {
            let checker = build_checker(&cli)?;
            commands::check::run(&checker, &commands::read_sql(sql)?, *json)?
        }
        Commands::Analyze { sql, json } => {
            let checker = build_checker(&cli)?;
            commands::analyze::run(&checker, &commands::read_sql(sql)?, *json)?
        }
        Commands::Batch { paths, json } => {
            let checker = build_checker(&cli)?;
            commands::batch::run(&checker, paths, *json)?
        }
    };

    Ok(if valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Loads the layered configuration and applies command-line overrides.
fn build_checker(cli: &Cli) -> Result<Checker> {
    let mut loader = ConfigLoader::new();
    if let Some(dir) = &cli.config_dir {
        loader = loader.with_project_dir(dir);
    }
    let mut config = loader.load()?;

    if let Some(dialect) = cli.dialect {
        config.dialect.name = dialect;
    }
    if cli.no_preprocess {
        config.dialect.preprocess = false;
    }

    tracing::debug!(dialect = %config.dialect.name, "configuration loaded");

    Checker::new(config).context("Invalid configuration")
}
