//! Error types for reseal operations.

use thiserror::Error;

/// The main error type for reseal operations.
///
/// The first two variants are run-level preconditions: when either occurs
/// nothing can be rotated and the run stops. The per-item variants
/// (`ItemFetch`, `Transform`, `Apply`) are caught by the run loop and
/// recorded against the secret that produced them.
#[derive(Error, Debug)]
pub enum ResealError {
    /// Sealed secrets could not be enumerated
    #[error("Inventory error: {0}")]
    Inventory(String),

    /// Public certificate or private key bundle could not be obtained
    #[error("Key fetch error: {0}")]
    KeyFetch(String),

    /// A single sealed secret's manifest could not be retrieved
    #[error("Fetch error: {0}")]
    ItemFetch(String),

    /// The unseal/reseal pipeline failed for a single secret
    #[error("Transform error: {0}")]
    Transform(String),

    /// The cluster rejected the resealed manifest
    #[error("Apply error: {0}")]
    Apply(String),

    /// Configuration-related error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// An external program could not be started or driven
    #[error("Process error: {0}")]
    Process(String),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl ResealError {
    /// Whether this error aborts the whole run rather than a single item.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ResealError::Inventory(_)
                | ResealError::KeyFetch(_)
                | ResealError::Config(_)
                | ResealError::Validation(_)
        )
    }

    /// Short label naming the stage that failed, used in reports.
    pub fn stage(&self) -> &'static str {
        match self {
            ResealError::Inventory(_) => "inventory",
            ResealError::KeyFetch(_) => "key-fetch",
            ResealError::ItemFetch(_) => "fetch",
            ResealError::Transform(_) => "transform",
            ResealError::Apply(_) => "apply",
            ResealError::Config(_) | ResealError::Validation(_) => "config",
            ResealError::Process(_) | ResealError::Io(_) => "process",
            ResealError::Yaml(_) | ResealError::Json(_) => "parse",
            ResealError::Other(_) => "other",
        }
    }
}

/// A specialized Result type for reseal operations.
pub type Result<T> = std::result::Result<T, ResealError>;

/// Helper macro to bail out with a ResealError
///
/// # Example
///
/// ```ignore
/// if output.trim().is_empty() {
///     bail!(KeyFetch, "controller returned an empty certificate");
/// }
/// ```
#[macro_export]
macro_rules! bail {
    ($variant:ident, $msg:expr) => {
        return Err($crate::ResealError::$variant($msg.to_string()))
    };
    ($variant:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::ResealError::$variant(format!($fmt, $($arg)*)))
    };
    ($msg:expr) => {
        return Err($crate::ResealError::Other($msg.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::ResealError::Other(format!($fmt, $($arg)*)))
    };
}
