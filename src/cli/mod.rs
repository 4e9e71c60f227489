//! CLI module for Medrights
//!
//! Provides commands:
//! - `analyze`: Verdict for a free-text account
//! - `evaluate`: Verdict for a JSON fact record
//! - `catalog`: List the loaded rules
//! - `schema`: Print the default fact record
//! - `history`: Recent audited queries

use crate::config::AppConfig;
use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use medrights_core::{FactExtractor, Pipeline, RuleCatalog};
use medrights_ledger::{AuditEntry, AuditSink, FanoutSink, JsonlAuditLog, SqliteHistory};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub mod analyze;
pub mod catalog;
pub mod history;

/// Medrights verdict engine CLI
#[derive(Parser, Debug)]
#[command(name = "medrights")]
#[command(about = "Deterministic verdicts on patient-provider disputes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a free-text account (reads stdin when TEXT is omitted)
    Analyze {
        /// Account of what happened
        text: Option<String>,
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
        /// Append a plain-text restatement of the proof
        #[arg(long)]
        explain: bool,
    },
    /// Evaluate a JSON fact record
    Evaluate {
        /// File holding the record
        #[arg(long)]
        facts: PathBuf,
        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the rules in the loaded catalog
    Catalog,
    /// Print the default fact record
    Schema,
    /// Show recent audited queries
    History {
        /// Maximum number of entries
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },
}

/// Shared state for one CLI invocation
pub struct Context {
    pub config: AppConfig,
    pub pipeline: Pipeline,
}

impl Context {
    /// Build the pipeline from configuration
    pub fn new(config: AppConfig) -> Result<Self> {
        let extractor = FactExtractor::standard()?;
        let catalog = match &config.catalog.path {
            Some(path) => RuleCatalog::from_path(path, extractor.schema())
                .with_context(|| format!("Failed to load catalog from {path}"))?,
            None => RuleCatalog::embedded(extractor.schema())?,
        };
        info!(
            version = catalog.version(),
            rules = catalog.len(),
            "Rule catalog loaded"
        );

        Ok(Self {
            pipeline: Pipeline::new(extractor, Arc::new(catalog)),
            config,
        })
    }

    /// Version stamped on audit records
    pub fn system_version(&self) -> String {
        self.config
            .system_version
            .clone()
            .unwrap_or_else(|| self.pipeline.catalog().version().to_string())
    }

    /// Append to the configured sinks. Audit failures are logged, not fatal.
    pub async fn record(&self, entry: AuditEntry) {
        if !self.config.audit.enabled {
            debug!("Audit disabled, entry dropped");
            return;
        }
        let sinks = self.open_sinks().await;
        if sinks.is_empty() {
            warn!("No audit sink available, entry dropped");
            return;
        }
        if let Err(e) = sinks.append(&entry).await {
            warn!(error = %e, "Failed to record audit entry");
        }
    }

    /// Each sink opens on its own; one failing does not block the other
    async fn open_sinks(&self) -> FanoutSink {
        let mut sinks = FanoutSink::new();

        let jsonl_path = self.config.audit.jsonl_path();
        match JsonlAuditLog::open(&jsonl_path).await {
            Ok(log) => sinks = sinks.with(Arc::new(log)),
            Err(e) => warn!(path = %jsonl_path.display(), error = %e, "Failed to open JSONL audit log"),
        }

        let sqlite_path = self.config.audit.sqlite_path();
        match SqliteHistory::from_path(&sqlite_path).await {
            Ok(history) => sinks = sinks.with(Arc::new(history)),
            Err(e) => warn!(path = %sqlite_path.display(), error = %e, "Failed to open SQLite history"),
        }

        sinks
    }
}

/// Run the CLI command
pub async fn run(cli: Cli, config: AppConfig) -> Result<ExitCode> {
    let Some(command) = cli.command else {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(ExitCode::SUCCESS);
    };

    let ctx = Context::new(config)?;
    match command {
        Commands::Analyze {
            text,
            json,
            explain,
        } => analyze::analyze(&ctx, text, json, explain).await,
        Commands::Evaluate { facts, json } => analyze::evaluate(&ctx, &facts, json).await,
        Commands::Catalog => catalog::catalog(&ctx),
        Commands::Schema => catalog::schema(&ctx),
        Commands::History { limit } => history::run(&ctx, limit).await,
    }
}
