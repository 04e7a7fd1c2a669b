//! Common utility functions.

pub mod fs;
pub mod process;

// Re-export commonly used items
pub use fs::{expand_path, ScratchFile};
pub use process::{redact_secrets, SystemExecutor};
