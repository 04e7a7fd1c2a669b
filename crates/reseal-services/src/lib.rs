//! # Reseal Services
//!
//! Command clients for the external tools reseal orchestrates.
//!
//! This crate provides async clients for:
//! - **kubectl**: listing, reading, and applying cluster resources
//! - **kubeseal**: fetching the sealing certificate, recovery unseal, and reseal
//!
//! Neither client spawns processes itself; both go through an injected
//! [`ProcessExecutor`](reseal_types::ProcessExecutor).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kubectl;
pub mod kubeseal;

pub use kubectl::KubectlClient;
pub use kubeseal::KubesealClient;

use reseal_types::config::RotatorSettings;
use reseal_types::{ProcessExecutor, ProcessOutput, ResealError, Result};
use std::sync::Arc;

/// Both tool clients, sharing one executor.
#[derive(Clone)]
pub struct ClusterTools {
    /// Cluster client
    pub kubectl: KubectlClient,
    /// Sealing CLI client
    pub kubeseal: KubesealClient,
}

impl ClusterTools {
    /// Build clients for the binaries and context named in `settings`.
    pub fn from_settings(settings: &RotatorSettings, executor: Arc<dyn ProcessExecutor>) -> Self {
        let mut kubectl = KubectlClient::new(Arc::clone(&executor), &settings.tools.kubectl);
        let mut kubeseal = KubesealClient::new(executor, &settings.tools.kubeseal);

        if let Some(context) = &settings.context {
            kubectl = kubectl.with_context(context);
            kubeseal = kubeseal.with_context(context);
        }

        Self { kubectl, kubeseal }
    }
}

/// Turn a finished process into its stdout, or a `Process` error naming
/// what was attempted.
pub(crate) fn expect_success(action: &str, output: ProcessOutput) -> Result<String> {
    if output.success() {
        Ok(output.stdout)
    } else {
        Err(ResealError::Process(format!(
            "{} failed ({})",
            action,
            output.diagnostic()
        )))
    }
}
