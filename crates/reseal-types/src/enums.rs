//! Common enumerations used throughout reseal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a run mutates the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Reseal and apply every secret
    #[default]
    Live,
    /// List and fetch keys, but record every secret as simulated
    DryRun,
}

impl RunMode {
    /// Build a mode from the `--dry-run` flag.
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            RunMode::DryRun
        } else {
            RunMode::Live
        }
    }

    /// Whether the cluster must be left untouched.
    pub fn is_dry_run(self) -> bool {
        self == RunMode::DryRun
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Live => write!(f, "live"),
            RunMode::DryRun => write!(f, "dry-run"),
        }
    }
}

/// Result of processing one sealed secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "kebab-case")]
pub enum RotationOutcome {
    /// Resealed under the current key and applied
    Rotated,
    /// Dry run: would have been rotated
    Simulated,
    /// Rotation failed; the cluster copy is unchanged
    Failed(String),
}

impl RotationOutcome {
    /// Rotated and simulated items both count as processed.
    pub fn is_success(&self) -> bool {
        !matches!(self, RotationOutcome::Failed(_))
    }

    /// Failure reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            RotationOutcome::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for RotationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationOutcome::Rotated => write!(f, "rotated"),
            RotationOutcome::Simulated => write!(f, "simulated"),
            RotationOutcome::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}
