//! Key material fetched from the sealing controller.
//!
//! Both wrappers keep their contents out of `Debug` output and zero their
//! buffers on drop. A run fetches one [`KeySet`] and shares it read-only
//! with every rotation, so all secrets in a batch are resealed against the
//! same controller key state.

use std::fmt;
use zeroize::Zeroizing;
use crate::identifiers::ControllerRef;

const PEM_CERTIFICATE_HEADER: &str = "-----BEGIN CERTIFICATE-----";

/// The controller's active public certificate, PEM encoded.
#[derive(Clone)]
pub struct PublicKeyMaterial {
    pem: Zeroizing<String>,
}

impl PublicKeyMaterial {
    /// Wrap a certificate as returned by the sealing CLI.
    pub fn new(pem: impl Into<String>) -> Self {
        Self {
            pem: Zeroizing::new(pem.into()),
        }
    }

    /// Raw certificate text.
    pub fn as_str(&self) -> &str {
        &self.pem
    }

    /// Raw certificate bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.pem.as_bytes()
    }

    /// Whether the blob carries a PEM certificate header.
    pub fn looks_like_pem(&self) -> bool {
        self.pem.contains(PEM_CERTIFICATE_HEADER)
    }
}

impl fmt::Debug for PublicKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKeyMaterial")
            .field("bytes", &self.pem.len())
            .finish()
    }
}

/// Every private key the controller has ever generated, as a YAML list of
/// cluster secrets.
#[derive(Clone)]
pub struct PrivateKeyBundle {
    document: Zeroizing<String>,
    key_count: usize,
}

impl PrivateKeyBundle {
    /// Wrap a key bundle document holding `key_count` keys.
    pub fn new(document: impl Into<String>, key_count: usize) -> Self {
        Self {
            document: Zeroizing::new(document.into()),
            key_count,
        }
    }

    /// Raw YAML document.
    pub fn as_str(&self) -> &str {
        &self.document
    }

    /// Raw YAML bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.document.as_bytes()
    }

    /// Number of keys (current and historical) in the bundle.
    pub fn key_count(&self) -> usize {
        self.key_count
    }
}

impl fmt::Debug for PrivateKeyBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKeyBundle")
            .field("keys", &self.key_count)
            .field("bytes", &"<redacted>")
            .finish()
    }
}

/// Public and private key material fetched together from one controller.
#[derive(Debug, Clone)]
pub struct KeySet {
    controller: ControllerRef,
    public: PublicKeyMaterial,
    private: PrivateKeyBundle,
}

impl KeySet {
    /// Bundle key material fetched from `controller`.
    pub fn new(controller: ControllerRef, public: PublicKeyMaterial, private: PrivateKeyBundle) -> Self {
        Self {
            controller,
            public,
            private,
        }
    }

    /// Controller the keys belong to.
    pub fn controller(&self) -> &ControllerRef {
        &self.controller
    }

    /// Current sealing certificate.
    pub fn public(&self) -> &PublicKeyMaterial {
        &self.public
    }

    /// Full private key history.
    pub fn private(&self) -> &PrivateKeyBundle {
        &self.private
    }

    /// Fragments that must never appear in logs or reports.
    pub fn sensitive_fragments(&self) -> Vec<&str> {
        vec![self.public.as_str(), self.private.as_str()]
    }
}
