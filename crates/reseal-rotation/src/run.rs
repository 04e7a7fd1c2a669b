//! End-to-end rotation run.

use crate::executor::RotationExecutor;
use crate::inventory::InventoryLister;
use crate::keys::KeyFetcher;
use crate::preflight::probe_tools;
use crate::report::RotationReport;
use reseal_services::ClusterTools;
use reseal_types::config::RotatorSettings;
use reseal_types::{Reporter, Result, RotationOutcome};
use std::sync::Arc;
use tracing::{info, warn};

/// One pass over every sealed secret in the cluster.
pub struct RotationRun {
    settings: RotatorSettings,
    tools: ClusterTools,
    reporter: Arc<dyn Reporter>,
}

impl RotationRun {
    /// Prepare a run; nothing is executed until [`execute`](Self::execute).
    pub fn new(settings: RotatorSettings, tools: ClusterTools, reporter: Arc<dyn Reporter>) -> Self {
        Self {
            settings,
            tools,
            reporter,
        }
    }

    /// List, fetch keys, then rotate each secret in turn.
    ///
    /// Returns an error only when the inventory or the key material cannot
    /// be obtained, in which case no secret has been touched. Per-secret
    /// failures are recorded in the report and the loop moves on.
    pub async fn execute(&self) -> Result<RotationReport> {
        let settings = &self.settings;
        let reporter = self.reporter.as_ref();
        let mut report = RotationReport::new(settings.mode, settings.controller.clone());

        if settings.verbose {
            reporter.section("Starting SealedSecret rotation process");
            reporter.info(&format!("Controller: {}", settings.controller));
            reporter.info(&format!("Dry run: {}", settings.mode.is_dry_run()));
            probe_tools(&self.tools, reporter).await;
        }

        reporter.section("Fetching all SealedSecrets in the cluster");
        let secrets = InventoryLister::new(self.tools.kubectl.clone())
            .list_sealed_secrets()
            .await?;
        reporter.success(&format!("Found {} SealedSecrets", secrets.len()));

        let keys = KeyFetcher::new(self.tools.kubectl.clone(), self.tools.kubeseal.clone())
            .fetch_key_set(&settings.controller, reporter)
            .await?;
        let executor = RotationExecutor::new(self.tools.clone(), settings.scratch_dir.clone());

        reporter.section("Processing SealedSecrets");
        for secret in secrets {
            if settings.verbose {
                reporter.info(&format!("Processing {} in namespace {}...", secret.name(), secret.namespace()));
            }

            if settings.mode.is_dry_run() {
                reporter.info(&format!("[DRY RUN] Would process {}", secret));
                report.record(secret, RotationOutcome::Simulated);
                continue;
            }

            match executor.rotate_one(&secret, &keys).await {
                Ok(()) => {
                    reporter.success(&format!("{} processed", secret));
                    report.record(secret, RotationOutcome::Rotated);
                }
                Err(e) => {
                    warn!("Rotation of {} failed at {}: {}", secret, e.stage(), e);
                    reporter.error(&format!("Error processing {}: {}", secret, e));
                    report.record(secret, RotationOutcome::Failed(e.to_string()));
                }
            }
        }

        report.finish();
        info!(
            "Run finished: {} processed, {} failed",
            report.processed_count(),
            report.failed_count()
        );
        report.render(reporter);

        Ok(report)
    }
}
