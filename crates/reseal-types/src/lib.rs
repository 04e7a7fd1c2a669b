//! # Reseal Types
//!
//! Core types, traits, and errors shared across all reseal crates.
//!
//! This crate provides the fundamental building blocks for rotating
//! sealed secrets onto a controller's current key:
//!
//! - Validated identifiers for sealed secrets and the sealing controller
//! - Key material wrappers that never print their contents
//! - Per-item rotation outcomes
//! - The `ProcessExecutor` and `Reporter` seams injected into the run
//! - Error types and result aliases
//!
//! ## Example
//!
//! ```
//! use reseal_types::{ControllerRef, SealedSecretRef};
//!
//! let secret = SealedSecretRef::new("db-credentials", "payments").unwrap();
//! assert_eq!(secret.to_string(), "payments/db-credentials");
//!
//! let controller = ControllerRef::default();
//! assert_eq!(controller.name(), "sealed-secrets");
//! assert_eq!(controller.namespace(), "kube-system");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod enums;
pub mod errors;
pub mod identifiers;
pub mod keys;
pub mod traits;

// Re-export common types for convenience
pub use enums::{RotationOutcome, RunMode};
pub use errors::{ResealError, Result};
pub use identifiers::{ControllerRef, SealedSecretRef};
pub use keys::{KeySet, PrivateKeyBundle, PublicKeyMaterial};
pub use traits::{ProcessExecutor, ProcessOutput, Reporter};
