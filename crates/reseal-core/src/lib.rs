//! # Reseal Core
//!
//! Core utilities, configuration management, logging, and process
//! execution for the reseal sealed-secret rotation tool.
//!
//! This crate provides:
//!
//! - **Configuration**: Layered settings (defaults, file, environment, flags)
//! - **Logging**: `tracing` subscriber setup honouring `RUST_LOG`
//! - **Terminal**: Colour control and terminal detection
//! - **Process Execution**: The production [`ProcessExecutor`](reseal_types::ProcessExecutor)
//!   backed by `tokio::process`, plus output redaction
//! - **File Operations**: Scoped temporary files for key material
//! - **Time Utilities**: Duration formatting for run summaries
//!
//! ## Example
//!
//! ```no_run
//! use reseal_core::config::Config;
//! use reseal_types::RunMode;
//!
//! let settings = Config::new()
//!     .with_process_env()
//!     .resolve(RunMode::Live, false)
//!     .unwrap();
//! assert_eq!(settings.tools.kubectl, "kubectl");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod log;
pub mod term;
pub mod time;
pub mod util;

// Re-export commonly used items
pub use config::Config;
pub use reseal_types::{ResealError, Result};
pub use util::process::SystemExecutor;

/// Reseal application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reseal application name
pub const APP_NAME: &str = "reseal";
