//! Type-safe identifiers for sealed secrets and the sealing controller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::errors::{ResealError, Result};

/// Default name of the sealed-secrets controller service.
pub const DEFAULT_CONTROLLER_NAME: &str = "sealed-secrets";

/// Default namespace hosting the sealed-secrets controller.
pub const DEFAULT_CONTROLLER_NAMESPACE: &str = "kube-system";

/// Check whether a string is a valid RFC 1123 DNS label.
///
/// Labels must:
/// - Be between 1 and 63 characters
/// - Contain only lowercase letters, digits, and hyphens
/// - Start and end with a lowercase letter or digit
pub fn is_dns_label(value: &str) -> bool {
    if value.is_empty() || value.len() > 63 {
        return false;
    }

    let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();

    let first_ok = value.chars().next().map(alnum).unwrap_or(false);
    let last_ok = value.chars().last().map(alnum).unwrap_or(false);

    first_ok && last_ok && value.chars().all(|c| alnum(c) || c == '-')
}

/// Identifies one sealed-secret resource in the cluster.
///
/// Created by the inventory listing and consumed read-only by the
/// rotation executor. Resource names may contain dots, so only the
/// namespace is held to DNS label rules.
///
/// # Example
///
/// ```
/// use reseal_types::SealedSecretRef;
///
/// let secret: SealedSecretRef = "payments/db-credentials".parse().unwrap();
/// assert_eq!(secret.name(), "db-credentials");
/// assert_eq!(secret.namespace(), "payments");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SealedSecretRef {
    name: String,
    namespace: String,
}

impl SealedSecretRef {
    /// Create a new sealed secret reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or contains a slash, or if
    /// the namespace is not a DNS label.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let namespace = namespace.into();

        if name.is_empty() || name.contains('/') {
            return Err(ResealError::Validation(format!(
                "Invalid sealed secret name '{}'",
                name
            )));
        }

        if !is_dns_label(&namespace) {
            return Err(ResealError::Validation(format!(
                "Invalid namespace '{}' for sealed secret '{}'",
                namespace, name
            )));
        }

        Ok(Self { name, namespace })
    }

    /// Resource name, unique within its namespace.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace holding the resource.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl fmt::Display for SealedSecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl FromStr for SealedSecretRef {
    type Err = ResealError;

    fn from_str(s: &str) -> Result<Self> {
        let (namespace, name) = s.split_once('/').ok_or_else(|| {
            ResealError::Validation(format!(
                "Expected 'namespace/name', got '{}'",
                s
            ))
        })?;
        Self::new(name, namespace)
    }
}

/// Identifies the sealed-secrets controller whose keys drive the rotation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControllerRef {
    name: String,
    namespace: String,
}

impl ControllerRef {
    /// Create a new validated controller reference.
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let namespace = namespace.into();

        if !is_dns_label(&name) {
            return Err(ResealError::Config(format!(
                "Invalid controller name '{}': must be a lowercase DNS label",
                name
            )));
        }
        if !is_dns_label(&namespace) {
            return Err(ResealError::Config(format!(
                "Invalid controller namespace '{}': must be a lowercase DNS label",
                namespace
            )));
        }

        Ok(Self { name, namespace })
    }

    /// Controller service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace hosting the controller and its key secrets.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl Default for ControllerRef {
    fn default() -> Self {
        Self {
            name: DEFAULT_CONTROLLER_NAME.to_string(),
            namespace: DEFAULT_CONTROLLER_NAMESPACE.to_string(),
        }
    }
}

impl fmt::Display for ControllerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
