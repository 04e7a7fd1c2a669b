//! Fetches the controller's key material.
//!
//! Keys are fetched once per run, before any secret is touched, so every
//! secret in the batch is resealed against the same key state even if
//! the controller rotates its own key mid-run.

use crate::in_stage;
use reseal_services::kubectl::SEALING_KEY_LABEL;
use reseal_services::{KubectlClient, KubesealClient};
use reseal_types::{bail, ControllerRef, KeySet, PrivateKeyBundle, PublicKeyMaterial, Reporter, ResealError, Result};
use tracing::{debug, info, warn};

/// Retrieves the current certificate and the private key history.
#[derive(Clone)]
pub struct KeyFetcher {
    kubectl: KubectlClient,
    kubeseal: KubesealClient,
}

impl KeyFetcher {
    /// Create a fetcher from the two tool clients.
    pub fn new(kubectl: KubectlClient, kubeseal: KubesealClient) -> Self {
        Self { kubectl, kubeseal }
    }

    /// Fetch the controller's active sealing certificate.
    pub async fn fetch_public_key(&self, controller: &ControllerRef) -> Result<PublicKeyMaterial> {
        let pem = self
            .kubeseal
            .fetch_cert(controller)
            .await
            .map_err(in_stage(ResealError::KeyFetch))?;

        if pem.trim().is_empty() {
            bail!(KeyFetch, "Controller {} returned an empty certificate", controller);
        }

        let public = PublicKeyMaterial::new(pem);
        if !public.looks_like_pem() {
            warn!("Certificate from {} has no PEM header; using it as-is", controller);
        }

        debug!("Fetched {} byte certificate from {}", public.as_bytes().len(), controller);
        Ok(public)
    }

    /// Fetch every key secret labeled as sealing key material in the
    /// controller's namespace.
    pub async fn fetch_private_keys(&self, controller_namespace: &str) -> Result<PrivateKeyBundle> {
        let yaml = self
            .kubectl
            .get_labeled("secret", controller_namespace, SEALING_KEY_LABEL)
            .await
            .map_err(in_stage(ResealError::KeyFetch))?;

        if yaml.trim().is_empty() {
            bail!(KeyFetch, "Empty response listing sealing keys in namespace {}", controller_namespace);
        }

        let names = key_names(&yaml)?;
        if names.is_empty() {
            bail!(
                KeyFetch,
                "No secrets labeled {} in namespace {}",
                SEALING_KEY_LABEL,
                controller_namespace
            );
        }

        for name in &names {
            debug!("Found sealing key {}/{}", controller_namespace, name);
        }
        info!("Fetched {} sealing keys from {}", names.len(), controller_namespace);

        Ok(PrivateKeyBundle::new(yaml, names.len()))
    }

    /// Fetch both halves of the key material, certificate first,
    /// narrating each step through `reporter`.
    pub async fn fetch_key_set(&self, controller: &ControllerRef, reporter: &dyn Reporter) -> Result<KeySet> {
        reporter.section("Fetching current public key");
        let public = self.fetch_public_key(controller).await?;
        reporter.success("Public key fetched successfully");

        reporter.section("Fetching private keys");
        let private = self.fetch_private_keys(controller.namespace()).await?;
        reporter.success(&format!(
            "Private keys fetched successfully ({} keys)",
            private.key_count()
        ));

        Ok(KeySet::new(controller.clone(), public, private))
    }
}

/// Names of the key secrets in a `kubectl get -o yaml` document.
///
/// Accepts either a `List` or a single object.
pub fn key_names(yaml: &str) -> Result<Vec<String>> {
    let doc: serde_yaml::Value = serde_yaml::from_str(yaml)
        .map_err(|e| ResealError::KeyFetch(format!("Malformed key bundle: {}", e)))?;

    let name_of = |item: &serde_yaml::Value| -> String {
        item.get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(|n| n.as_str())
            .unwrap_or("<unnamed>")
            .to_string()
    };

    match doc.get("items") {
        Some(serde_yaml::Value::Sequence(items)) => Ok(items.iter().map(name_of).collect()),
        Some(serde_yaml::Value::Null) => Ok(Vec::new()),
        Some(_) => Err(ResealError::KeyFetch("Key bundle 'items' is not a list".to_string())),
        None if doc.get("kind").and_then(|k| k.as_str()) == Some("Secret") => Ok(vec![name_of(&doc)]),
        None => Err(ResealError::KeyFetch("Key bundle is neither a List nor a Secret".to_string())),
    }
}
