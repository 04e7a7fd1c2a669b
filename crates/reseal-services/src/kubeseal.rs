//! kubeseal command client.

use crate::expect_success;
use crate::kubectl::first_line;
use reseal_types::{bail, ControllerRef, ProcessExecutor, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;
use zeroize::Zeroizing;

/// Sealing CLI client backed by the `kubeseal` binary.
#[derive(Clone)]
pub struct KubesealClient {
    executor: Arc<dyn ProcessExecutor>,
    binary: String,
    context: Option<String>,
}

impl KubesealClient {
    /// Create a client invoking `binary` through `executor`.
    pub fn new(executor: Arc<dyn ProcessExecutor>, binary: impl Into<String>) -> Self {
        Self {
            executor,
            binary: binary.into(),
            context: None,
        }
    }

    /// Target a specific kube context when talking to the controller.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Binary this client runs.
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Fetch the controller's active sealing certificate (PEM).
    pub async fn fetch_cert(&self, controller: &ControllerRef) -> Result<String> {
        debug!("Fetching sealing certificate from {}", controller);

        let mut args = vec![
            "--fetch-cert".to_string(),
            "--controller-name".to_string(),
            controller.name().to_string(),
            "--controller-namespace".to_string(),
            controller.namespace().to_string(),
        ];
        if let Some(context) = &self.context {
            args.push("--context".to_string());
            args.push(context.clone());
        }

        let output = self.executor.run(&self.binary, &args, None).await?;
        expect_success(&format!("kubeseal --fetch-cert from {}", controller), output)
    }

    /// Decrypt a sealed manifest offline using the private keys in
    /// `private_keys` (a file path).
    ///
    /// The plaintext secret is returned in a buffer that is zeroed on drop.
    pub async fn unseal(&self, private_keys: &Path, sealed_manifest: &str) -> Result<Zeroizing<String>> {
        let args = vec![
            "--recovery-unseal".to_string(),
            "--recovery-private-key".to_string(),
            private_keys.to_string_lossy().to_string(),
        ];

        let output = self
            .executor
            .run(&self.binary, &args, Some(sealed_manifest.as_bytes()))
            .await?;

        let plaintext = Zeroizing::new(expect_success("kubeseal --recovery-unseal", output)?);
        if plaintext.trim().is_empty() {
            bail!(Process, "kubeseal --recovery-unseal produced no output");
        }
        Ok(plaintext)
    }

    /// Seal a plaintext secret manifest with the certificate at `cert`,
    /// producing a YAML sealed-secret manifest.
    pub async fn reseal(&self, cert: &Path, controller: &ControllerRef, plaintext: &str) -> Result<String> {
        let args = vec![
            "--format=yaml".to_string(),
            format!("--cert={}", cert.to_string_lossy()),
            format!("--controller-name={}", controller.name()),
            format!("--controller-namespace={}", controller.namespace()),
        ];

        let output = self
            .executor
            .run(&self.binary, &args, Some(plaintext.as_bytes()))
            .await?;

        let sealed = expect_success("kubeseal reseal", output)?;
        if sealed.trim().is_empty() {
            bail!(Process, "kubeseal reseal produced no output");
        }
        Ok(sealed)
    }

    /// CLI version string.
    pub async fn version(&self) -> Result<String> {
        let args = vec!["--version".to_string()];
        let output = self.executor.run(&self.binary, &args, None).await?;
        expect_success("kubeseal --version", output).map(|out| first_line(&out))
    }
}
