//! Logging setup for reseal.
//!
//! Diagnostics go through `tracing` to stderr. User-facing narration is the
//! reporter's job and goes to stdout, so the two never interleave on the
//! same stream.

use tracing_subscriber::{fmt, EnvFilter};

/// Verbosity requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Warnings and errors only
    Quiet,
    /// Phase transitions and per-item results
    Verbose,
    /// Every external command and its exit status
    Debug,
}

impl Verbosity {
    /// Pick a verbosity from the `--verbose` and `--debug` flags.
    pub fn from_flags(verbose: bool, debug: bool) -> Self {
        if debug {
            Verbosity::Debug
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Quiet
        }
    }

    /// Default filter directive when `RUST_LOG` is not set.
    pub fn directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "reseal=warn",
            Verbosity::Verbose => "reseal=info",
            Verbosity::Debug => "reseal=debug",
        }
    }
}

/// Build the filter: `RUST_LOG` wins, otherwise the verbosity default.
pub fn filter_for(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directive()))
}

/// Initialize the global subscriber.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(verbosity: Verbosity) {
    let _ = fmt()
        .with_env_filter(filter_for(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .try_init();
}
