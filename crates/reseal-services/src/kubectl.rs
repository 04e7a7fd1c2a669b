//! kubectl command client.

use crate::expect_success;
use reseal_types::{ProcessExecutor, Result};
use std::sync::Arc;
use tracing::debug;

/// Resource type of sealed secrets.
pub const SEALED_SECRET_KIND: &str = "sealedsecrets.bitnami.com";

/// Label carried by every key secret the controller has generated.
pub const SEALING_KEY_LABEL: &str = "sealedsecrets.bitnami.com/sealed-secrets-key";

/// Cluster client backed by the `kubectl` binary.
#[derive(Clone)]
pub struct KubectlClient {
    executor: Arc<dyn ProcessExecutor>,
    binary: String,
    context: Option<String>,
}

impl KubectlClient {
    /// Create a client invoking `binary` through `executor`.
    pub fn new(executor: Arc<dyn ProcessExecutor>, binary: impl Into<String>) -> Self {
        Self {
            executor,
            binary: binary.into(),
            context: None,
        }
    }

    /// Target a specific kube context.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Binary this client runs.
    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn args(&self, rest: &[&str]) -> Vec<String> {
        let mut args = Vec::with_capacity(rest.len() + 2);
        if let Some(context) = &self.context {
            args.push("--context".to_string());
            args.push(context.clone());
        }
        args.extend(rest.iter().map(|s| s.to_string()));
        args
    }

    /// List every resource of `kind` across all namespaces, as JSON.
    pub async fn list_all(&self, kind: &str) -> Result<String> {
        debug!("Listing {} in all namespaces", kind);
        let args = self.args(&["get", kind, "--all-namespaces", "-o", "json"]);
        let output = self.executor.run(&self.binary, &args, None).await?;
        expect_success(&format!("kubectl get {} --all-namespaces", kind), output)
    }

    /// Fetch one resource as JSON.
    pub async fn get(&self, kind: &str, name: &str, namespace: &str) -> Result<String> {
        debug!("Fetching {} {}/{}", kind, namespace, name);
        let args = self.args(&["get", kind, name, "-n", namespace, "-o", "json"]);
        let output = self.executor.run(&self.binary, &args, None).await?;
        expect_success(&format!("kubectl get {} {}/{}", kind, namespace, name), output)
    }

    /// Fetch every resource of `kind` in `namespace` carrying `label`, as YAML.
    pub async fn get_labeled(&self, kind: &str, namespace: &str, label: &str) -> Result<String> {
        debug!("Fetching {} in {} labeled {}", kind, namespace, label);
        let args = self.args(&["get", kind, "-n", namespace, "-l", label, "-o", "yaml"]);
        let output = self.executor.run(&self.binary, &args, None).await?;
        expect_success(&format!("kubectl get {} -n {} -l {}", kind, namespace, label), output)
    }

    /// Apply a manifest read from stdin; returns kubectl's status line.
    pub async fn apply(&self, manifest: &str) -> Result<String> {
        let args = self.args(&["apply", "-f", "-"]);
        let output = self
            .executor
            .run(&self.binary, &args, Some(manifest.as_bytes()))
            .await?;
        expect_success("kubectl apply", output).map(|out| out.trim().to_string())
    }

    /// Client version string.
    pub async fn version(&self) -> Result<String> {
        let args = vec!["version".to_string(), "--client".to_string()];
        let output = self.executor.run(&self.binary, &args, None).await?;
        expect_success("kubectl version", output).map(|out| first_line(&out))
    }
}

pub(crate) fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().trim().to_string()
}
