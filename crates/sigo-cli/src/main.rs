//! `sigo`, the command-line front end for the SIGO personnel register.
//!
//! # Usage
//!
//! ```
//! sigo person add --re 123456 --name "João Pedro Silva Santos" --short SILVA --rank SGT
//! sigo absence add 1 --type MEDICO --from 2026-01-01 --until 2026-01-31
//! sigo restriction add 1 --codes "EF, LP" --from 2026-01-01 --until 2026-06-30
//! sigo board --on 2026-01-15
//! ```

mod commands;
mod display;
mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use sigo_core::{Registry, absence::AbsenceType, audit::EntityKind, person::Rank};
use sigo_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "sigo", version, about = "Military police personnel register")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, global = true, default_value = "sigo.toml")]
  config: PathBuf,

  /// SQLite database file; overrides `store_path`.
  #[arg(long, global = true, value_name = "FILE")]
  store: Option<PathBuf>,

  /// Acting user identity; overrides `current_user`.
  #[arg(long, global = true)]
  user: Option<String>,

  /// Print JSON instead of tables.
  #[arg(long, global = true)]
  json: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Manage registered persons.
  #[command(subcommand)]
  Person(PersonCommand),
  /// Manage absences (afastamentos).
  #[command(subcommand)]
  Absence(AbsenceCommand),
  /// Manage restrictions (restrições).
  #[command(subcommand)]
  Restriction(RestrictionCommand),
  /// Operational status of one person.
  Status {
    person: u64,
    /// Reference date (YYYY-MM-DD); defaults to today.
    #[arg(long, value_parser = parse_date_arg)]
    on:     Option<NaiveDate>,
  },
  /// Operational status of every active person.
  Board {
    #[arg(long, value_parser = parse_date_arg)]
    on: Option<NaiveDate>,
  },
  /// Browse the audit log, newest first.
  Audit {
    #[arg(long)]
    entity: Option<EntityKind>,
    #[arg(long, value_parser = parse_date_arg)]
    from:   Option<NaiveDate>,
    #[arg(long, value_parser = parse_date_arg)]
    until:  Option<NaiveDate>,
    #[arg(long)]
    actor:  Option<String>,
  },
  /// List the restriction code catalog.
  Codes,
}

#[derive(Subcommand, Debug)]
enum PersonCommand {
  Add {
    #[arg(long = "re")]
    registration_number: String,
    #[arg(long = "name")]
    full_name:           String,
    #[arg(long = "short")]
    short_name:          String,
    #[arg(long, default_value = "SD")]
    rank:                Rank,
    /// Register as inactive.
    #[arg(long)]
    inactive:            bool,
  },
  Edit {
    id:                  u64,
    #[arg(long = "re")]
    registration_number: Option<String>,
    #[arg(long = "name")]
    full_name:           Option<String>,
    #[arg(long = "short")]
    short_name:          Option<String>,
    #[arg(long)]
    rank:                Option<Rank>,
    #[arg(long)]
    active:              Option<bool>,
  },
  /// Remove a person together with their absences and restrictions.
  Rm { id: u64 },
  List {
    /// Substring of registration number or name.
    #[arg(long)]
    text:        Option<String>,
    #[arg(long)]
    active_only: bool,
  },
  /// Show a person with their status and records.
  Show {
    id: u64,
    #[arg(long, value_parser = parse_date_arg)]
    on: Option<NaiveDate>,
  },
}

#[derive(Args, Debug)]
struct AbsenceFields {
  #[arg(long = "type")]
  kind:     Option<AbsenceType>,
  #[arg(long, value_parser = parse_date_arg)]
  from:     Option<NaiveDate>,
  #[arg(long, value_parser = parse_date_arg)]
  until:    Option<NaiveDate>,
  #[arg(long)]
  document: Option<String>,
  #[arg(long)]
  note:     Option<String>,
}

#[derive(Subcommand, Debug)]
enum AbsenceCommand {
  Add {
    person: u64,
    #[command(flatten)]
    fields: AbsenceFields,
  },
  Edit {
    id:     u64,
    #[arg(long)]
    person: Option<u64>,
    #[command(flatten)]
    fields: AbsenceFields,
  },
  Rm { id: u64 },
  List {
    #[arg(long)]
    person: Option<u64>,
    #[arg(long = "type")]
    kind:   Option<AbsenceType>,
  },
}

#[derive(Args, Debug)]
struct RestrictionFields {
  /// Comma- or space-separated codes, e.g. "EF, LP".
  #[arg(long)]
  codes: Option<String>,
  #[arg(long, value_parser = parse_date_arg)]
  from:  Option<NaiveDate>,
  #[arg(long, value_parser = parse_date_arg)]
  until: Option<NaiveDate>,
  #[arg(long)]
  note:  Option<String>,
}

#[derive(Subcommand, Debug)]
enum RestrictionCommand {
  Add {
    person: u64,
    #[command(flatten)]
    fields: RestrictionFields,
  },
  Edit {
    id:     u64,
    #[arg(long)]
    person: Option<u64>,
    #[command(flatten)]
    fields: RestrictionFields,
  },
  Rm { id: u64 },
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
  sigo_core::date::parse_date(s).map_err(|e| e.to_string())
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let settings = Settings::load(&cli.config)?.with_overrides(cli.store, cli.user);

  if let Some(dir) = settings.store_path.parent()
    && !dir.as_os_str().is_empty()
  {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("failed to create {}", dir.display()))?;
  }

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;
  let registry = Registry::new(store, settings.current_user);

  let output = commands::run(&registry, cli.command, cli.json).await?;
  print!("{output}");
  Ok(())
}
