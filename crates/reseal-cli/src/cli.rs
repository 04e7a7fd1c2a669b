//! CLI structure and option handling.

use anyhow::{Context, Result};
use clap::Parser;
use reseal_core::config::Config;
use reseal_core::SystemExecutor;
use reseal_rotation::RotationRun;
use reseal_services::ClusterTools;
use reseal_types::config::{RotatorSettings, SettingsLayer};
use reseal_types::RunMode;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::ui::reporter::ConsoleReporter;

#[derive(Parser, Debug)]
#[command(name = "reseal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Re-encrypt every SealedSecret in the cluster with the controller's current key", long_about = None)]
pub struct Cli {
    /// Name of the sealed-secrets controller [default: sealed-secrets]
    #[arg(long, value_name = "NAME")]
    pub controller_name: Option<String>,

    /// Namespace of the sealed-secrets controller [default: kube-system]
    #[arg(long, value_name = "NAMESPACE")]
    pub controller_namespace: Option<String>,

    /// Fetch keys and list secrets, but change nothing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Narrate each secret as it is processed
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging of every external command
    #[arg(short, long)]
    pub debug: bool,

    /// Config file [default: ~/.reseal/config.yml]
    #[arg(short, long, env = "RESEAL_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// kubectl binary to use
    #[arg(long, value_name = "PATH")]
    pub kubectl: Option<String>,

    /// kubeseal binary to use
    #[arg(long, value_name = "PATH")]
    pub kubeseal: Option<String>,

    /// Kube context passed to kubectl and kubeseal
    #[arg(long, value_name = "CONTEXT")]
    pub context: Option<String>,

    /// Directory for temporary key files
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Settings given explicitly on the command line.
    pub fn flags(&self) -> SettingsLayer {
        SettingsLayer {
            controller_name: self.controller_name.clone(),
            controller_namespace: self.controller_namespace.clone(),
            kubectl: self.kubectl.clone(),
            kubeseal: self.kubeseal.clone(),
            context: self.context.clone(),
            scratch_dir: self.scratch_dir.clone(),
        }
    }

    /// Resolve defaults, config file, environment and flags.
    pub fn settings(&self) -> Result<RotatorSettings> {
        let config = match (&self.config, Config::default_path()) {
            (Some(path), _) => Config::new().with_file(path, true)?,
            (None, Some(path)) => Config::new().with_file(path, false)?,
            (None, None) => Config::new(),
        };

        if let Some(path) = config.file_path() {
            debug!("Using config file {}", path.display());
        }

        config
            .with_process_env()
            .with_flags(self.flags())
            .resolve(RunMode::from_dry_run(self.dry_run), self.verbose || self.debug)
            .context("Invalid configuration")
    }

    pub async fn execute(&self) -> Result<()> {
        let settings = self.settings()?;
        debug!("Resolved settings: {:?}", settings);

        let tools = ClusterTools::from_settings(&settings, Arc::new(SystemExecutor::new()));
        let reporter = Arc::new(ConsoleReporter::stdout());

        let report = RotationRun::new(settings, tools, reporter)
            .execute()
            .await
            .context("Rotation aborted")?;

        debug!(
            "{} run: {} processed, {} failed",
            report.mode(),
            report.processed_count(),
            report.failed_count()
        );
        Ok(())
    }
}
