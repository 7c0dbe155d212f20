//! Plugin system for Storeplug
//!
//! This module loads externally compiled components at process startup. A
//! colon-separated list of shared objects is read from configuration; each is
//! opened, checked for the factory symbol contract and registered into the
//! component registry so the host can instantiate it by name later.
//!
//! # Architecture
//!
//! - **source**: Splits the configured list into a `PluginDescriptor`
//! - **native**: Opens shared objects (`ModuleOpener`, `LibraryOpener`) and checks suffixes
//! - **signature**: Factory symbol names, the expected signature, `export_component!`
//! - **registrar**: Calls the verified factory and inserts into the registry
//! - **loader**: Drives the pipeline, times and logs each plugin, stops on the first fatal error
//!
//! # Failure model
//!
//! A path without the platform library suffix is logged and skipped. Every
//! other failure (open error, missing symbol, signature mismatch, registry
//! rejection) aborts loading; the host must not start.
//!
//! # Usage
//!
//! ```rust,no_run
//! use storeplug::config::LoaderConfig;
//! use storeplug::plugins::initialize_plugins;
//!
//! let config = LoaderConfig::from_env().unwrap();
//! match initialize_plugins(&config) {
//!     Ok(report) => println!("Loaded {} plugins", report.registered.len()),
//!     Err(e) => {
//!         eprintln!("failed to initialize plugin: {}", e);
//!         std::process::exit(1);
//!     }
//! }
//! ```

pub mod loader;
pub mod native;
pub mod registrar;
pub mod signature;
pub mod source;

pub use loader::{initialize_plugins, LoadReport, LoadedPlugin, PluginLoader};
pub use native::{LibraryOpener, LoadedModule, ModuleOpener, LIBRARY_SUFFIX};
pub use signature::{factory_signature, resolve_factory, FACTORY_SYMBOL, SIGNATURE_SYMBOL};
pub use source::PluginDescriptor;
