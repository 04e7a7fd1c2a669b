//! Tool availability probe.

use reseal_services::ClusterTools;
use reseal_types::Reporter;
use tracing::warn;

/// Report the versions of both external tools.
///
/// Never fails the run; a missing or broken tool shows up again as a
/// proper error at the first real call.
pub async fn probe_tools(tools: &ClusterTools, reporter: &dyn Reporter) {
    match tools.kubectl.version().await {
        Ok(version) => reporter.info(&format!("{}: {}", tools.kubectl.binary(), version)),
        Err(e) => warn!("Could not determine {} version: {}", tools.kubectl.binary(), e),
    }

    match tools.kubeseal.version().await {
        Ok(version) => reporter.info(&format!("{}: {}", tools.kubeseal.binary(), version)),
        Err(e) => warn!("Could not determine {} version: {}", tools.kubeseal.binary(), e),
    }
}
