//! academy-sync CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: flags and environment (`REDMINE_API_KEY` is
//!    required) become one [`reconcile::RunConfig`].
//! 2. **Wire observability**: configure `tracing-subscriber` with a text or
//!    JSON layer and, when `OTEL_EXPORTER_OTLP_ENDPOINT` is set, an
//!    OpenTelemetry OTLP exporter.
//! 3. **Load the job catalog** from the Ansible vars file.
//! 4. **Construct infrastructure**: a [`redmine::RedmineClient`] and an
//!    [`artifacts::FsArtifactScanner`], injected into [`reconcile::Reconciler`].
//! 5. **Map the outcome to an exit code**: `0` completed, `1` configuration or
//!    transport failure, `2` reconciliation aborted on an unmatched job.

mod catalog;
mod config;
mod telemetry;

use std::process::ExitCode;

use anyhow::{Context, Result};
use artifacts::FsArtifactScanner;
use clap::Parser;
use reconcile::{Reconciler, RunOutcome};
use redmine::RedmineClient;
use tracing::{error, info};

use crate::catalog::load_catalog;
use crate::config::Cli;

const EXIT_FAILURE: u8 = 1;
const EXIT_ABORTED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = match telemetry::init(cli.log_format, &cli.log_level) {
        Ok(telemetry) => telemetry,
        Err(err) => {
            eprintln!("academy-sync: {err:#}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    let code = match run(&cli).await {
        Ok(RunOutcome::Completed) => ExitCode::SUCCESS,
        Ok(RunOutcome::Aborted { folder, job }) => {
            error!(folder = %folder, job = %job, "Reconciliation aborted on unmatched job");
            ExitCode::from(EXIT_ABORTED)
        }
        Err(err) => {
            error!(error = %format!("{err:#}"), "Run failed");
            ExitCode::from(EXIT_FAILURE)
        }
    };

    telemetry.shutdown();
    code
}

async fn run(cli: &Cli) -> Result<RunOutcome> {
    let config = cli.run_config(config::api_key_from_env()?);

    let catalog = load_catalog(&cli.catalog)
        .with_context(|| format!("failed to load job catalog {}", cli.catalog.display()))?;
    info!(
        catalog = %cli.catalog.display(),
        folders = catalog.folders().len(),
        jobs = catalog.job_count(),
        "Job catalog loaded"
    );

    let tracker = RedmineClient::new(&config.tracker).context("failed to build tracker client")?;
    let scanner = FsArtifactScanner::new(&config.workspace_root);

    let report = Reconciler::new(&config, &tracker, &scanner)
        .run(&catalog)
        .await?;
    Ok(report.reconcile.outcome)
}
