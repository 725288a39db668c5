//! `muster` — provisioning entry points for the report-tracking database.
//!
//! # Usage
//!
//! ```
//! muster provision                 # additive: safe against live data
//! muster provision --skip-seed
//! muster reset --yes               # destructive: drops everything first
//! muster audit
//! muster allocate CASEVAC
//! muster allocate --frago
//! ```
//!
//! The database path comes from `--db-path`, the `MUSTER_DB_PATH` environment
//! variable, or an optional TOML config file. A missing path is a fatal
//! configuration error.

use std::path::PathBuf;

use anyhow::{bail, Context as _};
use clap::{Parser, Subcommand};
use muster_core::{sequence::SequenceKey, store::TrackerStore as _};
use muster_store_sqlite::SqliteStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "muster", about = "Provision the report-tracking database")]
struct Cli {
  /// Path to a TOML configuration file.
  #[arg(short, long, default_value = "muster.toml")]
  config: PathBuf,

  /// Path to the SQLite database file (overrides config and environment).
  #[arg(long, env = "MUSTER_DB_PATH")]
  db_path: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Additive provisioning: create missing tables/indexes and add missing
  /// columns. Safe to run repeatedly against a database holding data.
  Provision {
    /// Do not insert the demonstration fixture.
    #[arg(long)]
    skip_seed: bool,
  },

  /// Destructive provisioning: drop and recreate every table. All data is
  /// lost. Refuses to run without `--yes`.
  Reset {
    /// Confirm that losing all existing data is intended.
    #[arg(long)]
    yes: bool,

    /// Do not insert the demonstration fixture.
    #[arg(long)]
    skip_seed: bool,
  },

  /// Verify referential integrity and the unit-hierarchy invariant.
  Audit,

  /// Allocate and print the next number in a sequence stream.
  Allocate {
    /// Report-type stream to draw from (e.g. CASEVAC).
    report_type: Option<String>,

    /// Draw from the FRAGO stream instead.
    #[arg(long, conflicts_with = "report_type")]
    frago: bool,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file; environment variables with the
/// `MUSTER_` prefix override it.
#[derive(Deserialize, Default)]
struct Settings {
  db_path: Option<PathBuf>,
  /// Whether provisioning inserts the demonstration fixture by default.
  #[serde(default = "default_seed")]
  seed:    bool,
}

fn default_seed() -> bool { true }

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings: Settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("MUSTER"))
    .build()
    .context("failed to read configuration")?
    .try_deserialize()
    .context("failed to deserialise configuration")?;

  // CLI flag wins over environment/config file.
  let Some(db_path) = cli.db_path.or(settings.db_path) else {
    bail!("no database path configured: pass --db-path or set MUSTER_DB_PATH");
  };

  let store = SqliteStore::open(&db_path)
    .await
    .with_context(|| format!("failed to open database at {db_path:?}"))?;

  match cli.command {
    Command::Provision { skip_seed } => {
      store.provision().await.context("provisioning failed")?;
      tracing::info!("schema provisioned (additive)");

      if settings.seed && !skip_seed {
        store
          .seed_sample_data()
          .await
          .context("sample-data seeding failed")?;
        tracing::info!("demonstration fixture inserted");
      }
    }

    Command::Reset { yes, skip_seed } => {
      if !yes {
        bail!("reset drops every table; re-run with --yes to confirm");
      }
      store.reset().await.context("reset failed")?;
      tracing::warn!("all tables dropped and recreated");

      if settings.seed && !skip_seed {
        store
          .seed_sample_data()
          .await
          .context("sample-data seeding failed")?;
        tracing::info!("demonstration fixture inserted");
      }
    }

    Command::Audit => {
      let report = store.audit().await.context("audit failed")?;
      if report.is_clean() {
        tracing::info!("audit clean: all references resolve, hierarchy is a forest");
      } else {
        for violation in &report.violations {
          tracing::error!("{violation}");
        }
        bail!("audit found {} violation(s)", report.violations.len());
      }
    }

    Command::Allocate { report_type, frago } => {
      let key = if frago {
        SequenceKey::Frago
      } else {
        match report_type {
          Some(report_type) => SequenceKey::report(report_type),
          None => bail!("pass a report type (e.g. CASEVAC) or --frago"),
        }
      };

      let number = store
        .next_sequence(key.clone())
        .await
        .context("sequence allocation failed")?;
      println!("{key} -> {number}");
    }
  }

  Ok(())
}
