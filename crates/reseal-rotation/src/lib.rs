//! # Reseal Rotation
//!
//! Re-encrypts every sealed secret in a cluster under the sealing
//! controller's current key.
//!
//! A run is a straight line:
//! - [`inventory`]: list every sealed secret in every namespace
//! - [`keys`]: fetch the current certificate and the full private key
//!   history, once, for the whole batch
//! - [`executor`]: for each secret, unseal with the history, reseal with
//!   the certificate, apply
//! - [`report`]: collect one outcome per secret and summarise
//!
//! [`run::RotationRun`] drives the sequence. Failing to list secrets or to
//! fetch keys aborts the run; a failure on one secret is recorded and the
//! run moves on to the next.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod executor;
pub mod inventory;
pub mod keys;
pub mod preflight;
pub mod report;
pub mod run;

#[cfg(test)]
pub(crate) mod testing;

pub use executor::RotationExecutor;
pub use inventory::InventoryLister;
pub use keys::KeyFetcher;
pub use report::{ReportEntry, RotationReport};
pub use run::RotationRun;

use reseal_types::ResealError;

/// Re-file an error under the stage where it happened, keeping the
/// underlying message.
pub(crate) fn in_stage(stage: fn(String) -> ResealError) -> impl Fn(ResealError) -> ResealError {
    move |err| match err {
        ResealError::Process(msg) | ResealError::Other(msg) => stage(msg),
        other => stage(other.to_string()),
    }
}
