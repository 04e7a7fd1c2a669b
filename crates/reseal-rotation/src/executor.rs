//! Rotation of a single sealed secret.

use crate::in_stage;
use reseal_core::util::{redact_secrets, ScratchFile};
use reseal_services::kubectl::SEALED_SECRET_KIND;
use reseal_services::ClusterTools;
use reseal_types::{KeySet, ResealError, Result, SealedSecretRef};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Key material written to disk for the sealing CLI.
///
/// Both files are deleted when this value is dropped.
#[derive(Debug)]
pub struct KeyFiles {
    public: ScratchFile,
    private: ScratchFile,
}

impl KeyFiles {
    /// Write the certificate and private key bundle of `keys` into `dir`,
    /// or the system temp dir.
    pub fn write(keys: &KeySet, dir: Option<&Path>) -> Result<Self> {
        let public = ScratchFile::create(dir, "public-key-", ".pem", keys.public().as_bytes())?;
        let private = ScratchFile::create(dir, "private-keys-", ".yaml", keys.private().as_bytes())?;
        Ok(Self { public, private })
    }

    /// Path of the certificate file.
    pub fn certificate(&self) -> &Path {
        self.public.path()
    }

    /// Path of the private key bundle file.
    pub fn private_keys(&self) -> &Path {
        self.private.path()
    }
}

/// Unseals, reseals and applies one sealed secret at a time.
#[derive(Clone)]
pub struct RotationExecutor {
    tools: ClusterTools,
    scratch_dir: Option<PathBuf>,
}

impl RotationExecutor {
    /// Create an executor writing key files to `scratch_dir`
    /// (system temp dir when `None`).
    pub fn new(tools: ClusterTools, scratch_dir: Option<PathBuf>) -> Self {
        Self { tools, scratch_dir }
    }

    /// Re-encrypt `secret` under the current certificate in `keys` and
    /// apply it back to the cluster.
    ///
    /// The cluster copy is only touched by the final apply, so any error
    /// leaves it as it was. Key material and plaintext are scrubbed from
    /// the returned error.
    pub async fn rotate_one(&self, secret: &SealedSecretRef, keys: &KeySet) -> Result<()> {
        self.rotate(secret, keys).await.map_err(|err| redact(err, keys))
    }

    async fn rotate(&self, secret: &SealedSecretRef, keys: &KeySet) -> Result<()> {
        let sealed = self
            .tools
            .kubectl
            .get(SEALED_SECRET_KIND, secret.name(), secret.namespace())
            .await
            .map_err(in_stage(ResealError::ItemFetch))?;
        debug!("Fetched {} ({} bytes)", secret, sealed.len());

        let resealed = {
            let files = KeyFiles::write(keys, self.scratch_dir.as_deref())
                .map_err(in_stage(ResealError::Transform))?;

            let plaintext = self
                .tools
                .kubeseal
                .unseal(files.private_keys(), &sealed)
                .await
                .map_err(in_stage(ResealError::Transform))?;

            self.tools
                .kubeseal
                .reseal(files.certificate(), keys.controller(), &plaintext)
                .await
                .map_err(in_stage(ResealError::Transform))?
        };

        verify_identity(secret, &resealed)?;

        let status = self
            .tools
            .kubectl
            .apply(&resealed)
            .await
            .map_err(in_stage(ResealError::Apply))?;

        info!("Rotated {}: {}", secret, status);
        Ok(())
    }
}

/// Refuse to apply a manifest that would land anywhere but where the
/// original lives.
fn verify_identity(secret: &SealedSecretRef, manifest: &str) -> Result<()> {
    let doc: serde_yaml::Value = serde_yaml::from_str(manifest)
        .map_err(|e| ResealError::Transform(format!("Resealed manifest is not valid YAML: {}", e)))?;

    let meta = &doc["metadata"];
    let name = meta["name"].as_str();
    let namespace = meta["namespace"].as_str();

    if name != Some(secret.name()) || namespace.map_or(false, |ns| ns != secret.namespace()) {
        return Err(ResealError::Transform(format!(
            "Resealed manifest targets {}/{}, expected {}",
            namespace.unwrap_or("<none>"),
            name.unwrap_or("<none>"),
            secret
        )));
    }
    Ok(())
}

fn redact(err: ResealError, keys: &KeySet) -> ResealError {
    let scrub = |msg: String| redact_secrets(&msg, &keys.sensitive_fragments());
    match err {
        ResealError::ItemFetch(msg) => ResealError::ItemFetch(scrub(msg)),
        ResealError::Transform(msg) => ResealError::Transform(scrub(msg)),
        ResealError::Apply(msg) => ResealError::Apply(scrub(msg)),
        other => other,
    }
}
