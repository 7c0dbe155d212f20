//! Startup plugin loading for Storeplug
//!
//! This module drives the whole pipeline: every configured path is checked,
//! opened, verified and registered in order, one at a time. Each entry is
//! timed and logged. A path with the wrong suffix is logged and skipped; any
//! other failure stops the loop and is returned to the caller, which is
//! expected to end startup.

use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info};

use crate::component::{global, ComponentRegistry};
use crate::config::LoaderConfig;
use crate::error::{PluginError, RegistryError, Result};

use super::native::{check_suffix, LibraryOpener, ModuleOpener};
use super::registrar;
use super::signature::resolve_factory;
use super::source::PluginDescriptor;

/// A plugin whose component was registered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedPlugin {
    /// Path as it appeared in the plugin list.
    pub path: String,
    /// Component name the plugin registered.
    pub component: String,
    /// Wall time spent opening, verifying and registering, in milliseconds.
    pub elapsed_ms: f64,
}

/// Outcome of a successful loader run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    /// Registered plugins in load order.
    pub registered: Vec<LoadedPlugin>,
    /// Entries skipped for not being dynamic libraries.
    pub skipped: Vec<String>,
}

impl LoadReport {
    /// Whether the plugin list was empty.
    pub fn is_idle(&self) -> bool {
        self.registered.is_empty() && self.skipped.is_empty()
    }

    /// Registered component names in load order.
    pub fn component_names(&self) -> Vec<&str> {
        self.registered
            .iter()
            .map(|p| p.component.as_str())
            .collect()
    }
}

/// Loads plugins through a [`ModuleOpener`] into a [`ComponentRegistry`].
///
/// # Example
///
/// ```no_run
/// use storeplug::component::ComponentRegistry;
/// use storeplug::plugins::{PluginDescriptor, PluginLoader};
///
/// let descriptor = PluginDescriptor::resolve("/opt/plugins/cache.so:/opt/plugins/backend.so");
/// let mut registry = ComponentRegistry::new();
///
/// let report = PluginLoader::native().load_all(&descriptor, &mut registry).unwrap();
/// println!("Loaded {} plugins", report.registered.len());
/// ```
#[derive(Debug, Default)]
pub struct PluginLoader<O = LibraryOpener> {
    opener: O,
}

impl PluginLoader<LibraryOpener> {
    /// Loader backed by the platform dynamic loader.
    pub fn native() -> Self {
        Self::new(LibraryOpener)
    }
}

impl<O: ModuleOpener> PluginLoader<O> {
    /// Create a loader over the given opener.
    pub fn new(opener: O) -> Self {
        Self { opener }
    }

    /// Load every plugin in `descriptor`, in order.
    ///
    /// # Returns
    /// A report of registered and skipped entries. An empty descriptor is a
    /// successful no-op.
    ///
    /// # Errors
    /// The first fatal [`PluginError`]. Plugins before the failing entry stay
    /// registered; entries after it are never attempted.
    pub fn load_all(
        &self,
        descriptor: &PluginDescriptor,
        registry: &mut ComponentRegistry,
    ) -> std::result::Result<LoadReport, PluginError> {
        let mut report = LoadReport::default();

        if descriptor.is_empty() {
            info!("No plugins to load, plugin path is empty");
            return Ok(report);
        }

        for path in descriptor {
            if let Err(e) = check_suffix(path) {
                error!(plugin = %path, error = %e, "Skipping plugin");
                report.skipped.push(path.clone());
                continue;
            }

            info!(plugin = %path, "Loading plugin");
            let start = Instant::now();

            match self.load_plugin(path, registry) {
                Ok(component) => {
                    let elapsed = start.elapsed();
                    info!(
                        plugin = %path,
                        component = %component,
                        elapsed = ?elapsed,
                        "Plugin loaded"
                    );
                    report.registered.push(LoadedPlugin {
                        path: path.clone(),
                        component,
                        elapsed_ms: elapsed.as_secs_f64() * 1000.0,
                    });
                }
                Err(e) => {
                    error!(
                        plugin = %path,
                        error = %e,
                        elapsed = ?start.elapsed(),
                        "Failed to load plugin, aborting startup"
                    );
                    return Err(e);
                }
            }
        }

        info!(
            registered = report.registered.len(),
            skipped = report.skipped.len(),
            "Plugin loading complete"
        );
        Ok(report)
    }

    /// Open, verify and register a single plugin. Does not check the suffix.
    ///
    /// Returns the registered component name.
    pub fn load_plugin(
        &self,
        path: &str,
        registry: &mut ComponentRegistry,
    ) -> std::result::Result<String, PluginError> {
        let module = self.opener.open(Path::new(path))?;
        let factory = resolve_factory(module.as_ref(), path)?;
        let component = registrar::register(factory, path, registry)?;
        module.keep_resident();
        Ok(component)
    }
}

/// Load the configured plugins into the process-wide registry.
///
/// Holds the registry's write lock for the whole run.
pub fn initialize_plugins(config: &LoaderConfig) -> Result<LoadReport> {
    let descriptor = PluginDescriptor::resolve(config.raw_plugin_path());
    let mut registry = global().write().map_err(|_| RegistryError::Poisoned)?;
    let report = PluginLoader::native().load_all(&descriptor, &mut registry)?;
    Ok(report)
}
