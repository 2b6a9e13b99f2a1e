//! Ecole Maint - repairs the school JSON dataset in place.
//!
//! Loads the document, reconciles cross-references and default fields with
//! the ecole-engine reconciler, logs every repair, and writes the document
//! back only when something changed.
//!
//! # Environment Variables
//!
//! - `ECOLE_DB_PATH`: path of the JSON document (default: `db.json`)
//! - `ECOLE_DRY_RUN`: log repairs without writing (default: `false`)
//! - `ECOLE_BACKUP`: copy the original to `<path>.bak` before writing (default: `true`)
//! - `RUST_LOG`: log filter (default: `ecole_maint=info,ecole_engine=info`)

mod config;
mod db;
mod error;
mod maintenance;

use crate::config::Config;
use crate::db::{JsonFileStore, StoreLock};
use crate::error::Result;
use crate::maintenance::{Outcome, RunOptions};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    // Before tracing, so RUST_LOG may come from .env
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ecole_maint=info,ecole_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run() {
        Ok(outcome) => {
            if !outcome.violations.is_empty() {
                tracing::warn!(
                    "{} integrity violations left unresolved",
                    outcome.violations.len()
                );
            }
            tracing::info!("{}", done_line(&outcome));
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Maintenance failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Final summary, logged whether or not violations remain.
fn done_line(outcome: &Outcome) -> String {
    format!(
        "Done: {} repairs over {} records, store {}",
        outcome.report.len(),
        outcome.summary.total(),
        if outcome.written { "rewritten" } else { "unchanged" }
    )
}

fn run() -> Result<Outcome> {
    let config = Config::from_env()?;
    let store = JsonFileStore::new(&config.data_path);
    tracing::info!(
        dry_run = config.dry_run,
        backup = config.backup,
        "Reconciling {}",
        store.path().display()
    );

    let lock = StoreLock::acquire(store.path())?;
    tracing::debug!("Holding {}", lock.path().display());
    let options = RunOptions {
        dry_run: config.dry_run,
        backup: config.backup,
    };

    maintenance::run(&store, options, chrono::Utc::now())
}
