//! Command-line and environment configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use reconcile::{ApiKey, RunConfig, TrackerConfig};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// academy-sync - provision a course workspace and file one issue per CI job
#[derive(Parser, Debug)]
#[command(name = "academy-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the Ansible vars file holding the `jenkins_jobs` catalog
    #[arg(
        long,
        default_value = "/home/ubuntu/jenkins-lfs/playbooks/roles/ansible-gdt/vars/main.yml"
    )]
    pub catalog: PathBuf,

    /// Tracker base URL
    #[arg(long, env = "REDMINE_URL", default_value = "https://academy.garantideltalento.it")]
    pub tracker_url: String,

    /// Base URL of the CI server the issues link to
    #[arg(long, env = "JENKINS_URL", default_value = "https://jenkins.garantideltalento.it/")]
    pub ci_url: String,

    /// CI workspace directory holding one subtree per catalog folder
    #[arg(long, default_value = "/var/lib/jenkins/workspace")]
    pub workspace_root: PathBuf,

    /// Student the workspace is provisioned for
    #[arg(long, default_value = "student1")]
    pub student: String,

    /// Project display name [default: "Formazione - <student>"]
    #[arg(long)]
    pub project: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Log level or filter directive (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Environment variable holding the tracker API key. There is no flag for it,
/// so the key never appears in process listings.
pub const API_KEY_ENV: &str = "REDMINE_API_KEY";

/// Reads the tracker API key from [`API_KEY_ENV`].
pub fn api_key_from_env() -> Result<ApiKey> {
    parse_api_key(std::env::var(API_KEY_ENV).ok())
}

fn parse_api_key(value: Option<String>) -> Result<ApiKey> {
    let value = value.with_context(|| format!("{API_KEY_ENV} is not set"))?;
    ApiKey::new(value).with_context(|| format!("{API_KEY_ENV} must not be empty"))
}

impl Cli {
    /// Project display name, defaulting to one derived from the student.
    pub fn project_name(&self) -> String {
        self.project
            .clone()
            .unwrap_or_else(|| format!("Formazione - {}", self.student))
    }

    /// Builds the run configuration passed to every component.
    pub fn run_config(&self, api_key: ApiKey) -> RunConfig {
        RunConfig {
            tracker: TrackerConfig {
                base_url: self.tracker_url.clone(),
                api_key,
            },
            ci_base_url: self.ci_url.clone(),
            workspace_root: self.workspace_root.clone(),
            project_name: self.project_name(),
            student_name: self.student.clone(),
        }
        .normalized()
    }
}
