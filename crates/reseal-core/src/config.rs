//! Configuration management for reseal.
//!
//! Settings are resolved from several layers. Configuration values are
//! resolved in this priority order:
//! 1. Command-line flags
//! 2. Environment variables (`RESEAL_*`)
//! 3. Values loaded from a YAML file
//! 4. Built-in defaults
//!
//! ## Example
//!
//! ```
//! use reseal_core::config::Config;
//! use reseal_types::config::SettingsLayer;
//! use reseal_types::RunMode;
//!
//! let flags = SettingsLayer {
//!     controller_namespace: Some("sealed-secrets".into()),
//!     ..Default::default()
//! };
//!
//! let settings = Config::new()
//!     .with_flags(flags)
//!     .resolve(RunMode::DryRun, true)
//!     .unwrap();
//!
//! assert_eq!(settings.controller.namespace(), "sealed-secrets");
//! assert_eq!(settings.controller.name(), "sealed-secrets");
//! ```

use reseal_types::config::{RotatorSettings, SettingsLayer, ToolPaths, DEFAULT_KUBECTL, DEFAULT_KUBESEAL};
use reseal_types::identifiers::{DEFAULT_CONTROLLER_NAME, DEFAULT_CONTROLLER_NAMESPACE};
use reseal_types::{ControllerRef, ResealError, Result, RunMode};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming the controller service.
pub const ENV_CONTROLLER_NAME: &str = "RESEAL_CONTROLLER_NAME";
/// Environment variable naming the controller namespace.
pub const ENV_CONTROLLER_NAMESPACE: &str = "RESEAL_CONTROLLER_NAMESPACE";
/// Environment variable overriding the kubectl binary.
pub const ENV_KUBECTL: &str = "RESEAL_KUBECTL";
/// Environment variable overriding the kubeseal binary.
pub const ENV_KUBESEAL: &str = "RESEAL_KUBESEAL";
/// Environment variable selecting the kube context.
pub const ENV_CONTEXT: &str = "RESEAL_CONTEXT";
/// Environment variable selecting the scratch directory.
pub const ENV_SCRATCH_DIR: &str = "RESEAL_SCRATCH_DIR";

/// Configuration layer priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigLayer {
    /// Default values
    Default = 0,
    /// Values loaded from file
    Loaded = 1,
    /// Values from environment variables
    Environment = 2,
    /// Values from command-line flags
    Flags = 3,
}

/// Layered configuration builder.
#[derive(Clone, Debug)]
pub struct Config {
    layers: HashMap<ConfigLayer, SettingsLayer>,
    file_path: Option<PathBuf>,
}

impl Config {
    /// Create a configuration holding only the built-in defaults.
    pub fn new() -> Self {
        let mut layers = HashMap::new();
        layers.insert(
            ConfigLayer::Default,
            SettingsLayer {
                controller_name: Some(DEFAULT_CONTROLLER_NAME.to_string()),
                controller_namespace: Some(DEFAULT_CONTROLLER_NAMESPACE.to_string()),
                kubectl: Some(DEFAULT_KUBECTL.to_string()),
                kubeseal: Some(DEFAULT_KUBESEAL.to_string()),
                context: None,
                scratch_dir: None,
            },
        );

        Self {
            layers,
            file_path: None,
        }
    }

    /// Load the file layer from `path`.
    ///
    /// An explicitly requested file must exist; the default location is
    /// optional and silently skipped when missing.
    pub fn with_file(mut self, path: impl AsRef<Path>, required: bool) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            if required {
                return Err(ResealError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            debug!("No config file at {}, skipping", path.display());
            return Ok(self);
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ResealError::Config(format!("Failed to read config file {}: {}", path.display(), e)))?;

        // An empty file is a valid, empty layer.
        let layer: SettingsLayer = if content.trim().is_empty() {
            SettingsLayer::default()
        } else {
            serde_yaml::from_str(&content)
                .map_err(|e| ResealError::Config(format!("Failed to parse config file {}: {}", path.display(), e)))?
        };

        debug!("Loaded config file {}", path.display());
        self.layers.insert(ConfigLayer::Loaded, layer);
        self.file_path = Some(path.to_path_buf());
        Ok(self)
    }

    /// Read the environment layer from the current process environment.
    pub fn with_process_env(self) -> Self {
        self.with_env(std::env::vars())
    }

    /// Read the environment layer from an explicit set of variables.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut layer = SettingsLayer::default();

        for (key, value) in vars {
            let value: String = value.into();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                ENV_CONTROLLER_NAME => layer.controller_name = Some(value),
                ENV_CONTROLLER_NAMESPACE => layer.controller_namespace = Some(value),
                ENV_KUBECTL => layer.kubectl = Some(value),
                ENV_KUBESEAL => layer.kubeseal = Some(value),
                ENV_CONTEXT => layer.context = Some(value),
                ENV_SCRATCH_DIR => layer.scratch_dir = Some(PathBuf::from(value)),
                _ => {}
            }
        }

        self.layers.insert(ConfigLayer::Environment, layer);
        self
    }

    /// Set the command-line flag layer.
    pub fn with_flags(mut self, flags: SettingsLayer) -> Self {
        self.layers.insert(ConfigLayer::Flags, flags);
        self
    }

    /// Path of the loaded config file, if any.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Merge every layer, lowest priority first.
    pub fn merged(&self) -> SettingsLayer {
        let order = [
            ConfigLayer::Default,
            ConfigLayer::Loaded,
            ConfigLayer::Environment,
            ConfigLayer::Flags,
        ];

        order
            .iter()
            .filter_map(|layer| self.layers.get(layer).cloned())
            .fold(SettingsLayer::default(), SettingsLayer::merge)
    }

    /// Resolve and validate the final settings for a run.
    pub fn resolve(&self, mode: RunMode, verbose: bool) -> Result<RotatorSettings> {
        let merged = self.merged();

        let controller = ControllerRef::new(
            merged.controller_name.unwrap_or_default(),
            merged.controller_namespace.unwrap_or_default(),
        )?;

        let tools = ToolPaths {
            kubectl: non_empty(merged.kubectl, "kubectl")?,
            kubeseal: non_empty(merged.kubeseal, "kubeseal")?,
        };

        let scratch_dir = merged.scratch_dir.map(crate::util::fs::expand_path);
        if let Some(dir) = &scratch_dir {
            if !dir.is_dir() {
                return Err(ResealError::Config(format!(
                    "Scratch directory does not exist: {}",
                    dir.display()
                )));
            }
        }

        Ok(RotatorSettings {
            controller,
            tools,
            context: merged.context.filter(|c| !c.is_empty()),
            scratch_dir,
            mode,
            verbose,
        })
    }

    /// Default config file location (`~/.reseal/config.yml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".reseal").join("config.yml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(value: Option<String>, what: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ResealError::Config(format!("No {} binary configured", what))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Config::new().resolve(RunMode::Live, false).unwrap();
        assert_eq!(settings.controller, ControllerRef::default());
        assert_eq!(settings.tools, ToolPaths::default());
        assert_eq!(settings.context, None);
        assert!(!settings.mode.is_dry_run());
    }

    #[test]
    fn test_layer_priority() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "controller_name: file-controller").unwrap();
        writeln!(file, "controller_namespace: file-ns").unwrap();
        writeln!(file, "kubeseal: /opt/kubeseal").unwrap();

        let settings = Config::new()
            .with_file(file.path(), true)
            .unwrap()
            .with_env(vec![
                (ENV_CONTROLLER_NAMESPACE, "env-ns"),
                (ENV_CONTEXT, "staging"),
            ])
            .with_flags(SettingsLayer {
                controller_name: Some("flag-controller".into()),
                ..Default::default()
            })
            .resolve(RunMode::DryRun, true)
            .unwrap();

        assert_eq!(settings.controller.name(), "flag-controller");
        assert_eq!(settings.controller.namespace(), "env-ns");
        assert_eq!(settings.tools.kubeseal, "/opt/kubeseal");
        assert_eq!(settings.tools.kubectl, "kubectl");
        assert_eq!(settings.context.as_deref(), Some("staging"));
        assert!(settings.mode.is_dry_run());
        assert!(settings.verbose);
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let settings = Config::new()
            .with_env(vec![(ENV_CONTROLLER_NAME, "")])
            .resolve(RunMode::Live, false)
            .unwrap();
        assert_eq!(settings.controller.name(), "sealed-secrets");
    }

    #[test]
    fn test_missing_required_file() {
        let result = Config::new().with_file("/nonexistent/reseal.yml", true);
        assert!(matches!(result, Err(ResealError::Config(_))));

        let optional = Config::new().with_file("/nonexistent/reseal.yml", false).unwrap();
        assert!(optional.file_path().is_none());
    }

    #[test]
    fn test_invalid_controller_is_config_error() {
        let err = Config::new()
            .with_flags(SettingsLayer {
                controller_namespace: Some("Kube_System".into()),
                ..Default::default()
            })
            .resolve(RunMode::Live, false)
            .unwrap_err();
        assert!(matches!(err, ResealError::Config(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_scratch_dir_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Config::new()
            .with_env(vec![(ENV_SCRATCH_DIR, dir.path().to_string_lossy().to_string())])
            .resolve(RunMode::Live, false)
            .unwrap();
        assert_eq!(settings.scratch_dir.as_deref(), Some(dir.path()));

        let err = Config::new()
            .with_env(vec![(ENV_SCRATCH_DIR, "/nonexistent/scratch")])
            .resolve(RunMode::Live, false);
        assert!(err.is_err());
    }
}
