//! Storeplug - startup plugin loader for a storage service's component registry

pub mod component;
pub mod config;
pub mod error;
pub mod plugins;

pub use component::{Component, ComponentPriority, ComponentRegistry};
pub use config::LoaderConfig;
pub use error::{PluginError, RegistryError, Result, StoreplugError};
