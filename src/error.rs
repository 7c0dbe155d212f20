//! Error types for Storeplug
//!
//! This module defines all error types used by the loader and the component
//! registry. Uses `thiserror` for ergonomic error handling with automatic
//! `Display` and `Error` trait implementations.

use thiserror::Error;

/// The primary error type for Storeplug operations.
#[derive(Error, Debug)]
pub enum StoreplugError {
    /// Configuration-related errors (unreadable plugin path value, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A plugin failed to load; startup must not continue.
    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    /// Component registry rejected an operation.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Errors raised while loading a single plugin.
///
/// Only [`PluginError::InvalidSuffix`] is skippable; every other variant
/// aborts the startup sequence.
#[derive(Error, Debug)]
pub enum PluginError {
    /// The path does not end with the platform dynamic-library suffix.
    #[error("Invalid plugin file extension: {path} (expected suffix '{expected}')")]
    InvalidSuffix {
        path: String,
        expected: &'static str,
    },

    /// The shared object could not be opened (missing file, wrong
    /// architecture, malformed binary).
    #[error("Error opening plugin {path}: {reason}")]
    Open { path: String, reason: String },

    /// The factory symbol is not exported by the plugin.
    #[error("{symbol} function lookup error in plugin {path}: {reason}")]
    SymbolNotFound {
        path: String,
        symbol: &'static str,
        reason: String,
    },

    /// The factory symbol exists but does not declare the expected shape.
    #[error(
        "{symbol} function in {path} has an incorrect definition: expected '{expected}', found {}",
        .found.as_deref().map(|f| format!("'{}'", f)).unwrap_or_else(|| "no signature declaration".to_string())
    )]
    SignatureMismatch {
        path: String,
        symbol: &'static str,
        expected: String,
        found: Option<String>,
    },

    /// The registry refused the component produced by the plugin.
    #[error("Plugin {path} could not register its component: {source}")]
    Registration {
        path: String,
        #[source]
        source: RegistryError,
    },
}

impl PluginError {
    /// Whether this failure must abort the whole startup sequence.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PluginError::InvalidSuffix { .. })
    }

    /// The plugin path this error refers to.
    pub fn path(&self) -> &str {
        match self {
            PluginError::InvalidSuffix { path, .. }
            | PluginError::Open { path, .. }
            | PluginError::SymbolNotFound { path, .. }
            | PluginError::SignatureMismatch { path, .. }
            | PluginError::Registration { path, .. } => path,
        }
    }
}

/// Errors returned by the component registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Component names are registry keys and must be non-empty.
    #[error("component name must not be empty")]
    EmptyName,

    /// A component with this name is already registered.
    #[error("component '{0}' is already registered")]
    Duplicate(String),

    /// The registry no longer accepts insertions.
    #[error("registry is sealed, cannot add component '{0}'")]
    Sealed(String),

    /// A writer panicked while holding the global registry lock.
    #[error("global component registry lock is poisoned")]
    Poisoned,
}

/// A specialized `Result` type for Storeplug operations.
pub type Result<T> = std::result::Result<T, StoreplugError>;
