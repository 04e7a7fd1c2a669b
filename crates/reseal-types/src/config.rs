//! Configuration types and structures.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::enums::RunMode;
use crate::identifiers::ControllerRef;

/// Default cluster client binary.
pub const DEFAULT_KUBECTL: &str = "kubectl";

/// Default sealing CLI binary.
pub const DEFAULT_KUBESEAL: &str = "kubeseal";

/// One partial layer of settings.
///
/// Every field is optional; layers are stacked (defaults, file,
/// environment, flags) and the highest layer that sets a field wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsLayer {
    /// Sealing controller service name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller_name: Option<String>,
    /// Namespace hosting the controller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller_namespace: Option<String>,
    /// Path or name of the cluster client binary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubectl: Option<String>,
    /// Path or name of the sealing CLI binary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeseal: Option<String>,
    /// Kube context passed to both tools
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Directory for temporary key files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
}

impl SettingsLayer {
    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: SettingsLayer) -> SettingsLayer {
        SettingsLayer {
            controller_name: other.controller_name.or(self.controller_name),
            controller_namespace: other.controller_namespace.or(self.controller_namespace),
            kubectl: other.kubectl.or(self.kubectl),
            kubeseal: other.kubeseal.or(self.kubeseal),
            context: other.context.or(self.context),
            scratch_dir: other.scratch_dir.or(self.scratch_dir),
        }
    }
}

/// Binaries used for cluster and sealing operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPaths {
    /// Cluster client
    pub kubectl: String,
    /// Sealing CLI
    pub kubeseal: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            kubectl: DEFAULT_KUBECTL.to_string(),
            kubeseal: DEFAULT_KUBESEAL.to_string(),
        }
    }
}

/// Fully resolved settings for one rotation run.
#[derive(Debug, Clone)]
pub struct RotatorSettings {
    /// Controller whose keys are used
    pub controller: ControllerRef,
    /// External tool binaries
    pub tools: ToolPaths,
    /// Optional kube context
    pub context: Option<String>,
    /// Directory for temporary key files (system temp dir when unset)
    pub scratch_dir: Option<PathBuf>,
    /// Live or dry run
    pub mode: RunMode,
    /// Per-item narration
    pub verbose: bool,
}

impl Default for RotatorSettings {
    fn default() -> Self {
        Self {
            controller: ControllerRef::default(),
            tools: ToolPaths::default(),
            context: None,
            scratch_dir: None,
            mode: RunMode::Live,
            verbose: false,
        }
    }
}
