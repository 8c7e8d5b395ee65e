//! High-level runner API for the forms exporter.
//!
//! This module wires the configuration file, the credential provider and the
//! scheduler together. It is the primary API for the CLI.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::POLL_INTERVAL;
use crate::coordination::{ExportContext, Scheduler};
use crate::io::{ApiClientArgsBuilder, CredentialProvider, TokenCredentialProvider, TokenSource};
use crate::settings::ExporterConfig;

pub use crate::telemetry::CycleStats;

/// Arguments for running the exporter
#[derive(Clone)]
pub struct RunArgs {
    /// YAML configuration file
    pub config_path: PathBuf,
    /// Directory relative output file names resolve against (default: the
    /// configuration file's directory)
    pub output_dir: Option<PathBuf>,
    pub poll_interval: Duration,

    // Test-only: inject a credential provider instead of reading a token
    #[cfg(test)]
    pub test_credentials: Option<Arc<dyn CredentialProvider>>,
}

impl RunArgs {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            output_dir: None,
            poll_interval: POLL_INTERVAL,
            #[cfg(test)]
            test_credentials: None,
        }
    }
}

/// Run a single export pass over every configured form
///
/// # Example
///
/// ```no_run
/// use forms_exporter::runner::{RunArgs, run_once};
///
/// # async fn example() -> anyhow::Result<()> {
/// let stats = run_once(RunArgs::new("config.yml")).await?;
/// println!("Exported {} forms", stats.forms_exported);
/// # Ok(())
/// # }
/// ```
pub async fn run_once(args: RunArgs) -> Result<CycleStats> {
    let scheduler = build_scheduler(args).await?;
    Ok(scheduler.run_once().await)
}

/// Poll forever: export every form at startup, then once per poll interval
pub async fn run_polling(args: RunArgs) -> Result<()> {
    let scheduler = build_scheduler(args).await?;
    scheduler.run_forever().await;
    Ok(())
}

async fn build_scheduler(args: RunArgs) -> Result<Scheduler> {
    let config = ExporterConfig::load(&args.config_path).await?;
    info!(
        "Loaded configuration for {} forms from {}",
        config.forms.len(),
        args.config_path.display()
    );

    let base_dir = config_dir(&args.config_path);
    let output_dir = args.output_dir.clone().unwrap_or_else(|| base_dir.clone());

    #[cfg(test)]
    let credentials = match args.test_credentials.clone() {
        Some(credentials) => credentials,
        None => token_provider(&config, &base_dir)?,
    };

    #[cfg(not(test))]
    let credentials = token_provider(&config, &base_dir)?;

    let context = Arc::new(ExportContext {
        config,
        credentials,
        output_dir,
    });

    Ok(Scheduler::new(context, args.poll_interval))
}

fn token_provider(config: &ExporterConfig, base_dir: &Path) -> Result<Arc<dyn CredentialProvider>> {
    let source = TokenSource::from_config(&config.credentials, base_dir);
    let api_args = ApiClientArgsBuilder::default()
        .build()
        .context("Failed to build API client settings")?;
    Ok(Arc::new(TokenCredentialProvider::new(source, api_args)?))
}

fn config_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
