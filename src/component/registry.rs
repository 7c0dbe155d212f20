//! Component registry for Storeplug
//!
//! This module provides the `ComponentRegistry` struct mapping component
//! names to their constructors, plus the process-wide instance the plugin
//! loader writes into at startup. Names are unique; the first registration of
//! a name wins and later attempts are rejected. Once the startup window closes
//! the registry is sealed and becomes read-only.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use tracing::{debug, info};

use crate::error::RegistryError;

use super::{Component, ComponentConstructor};

static GLOBAL_REGISTRY: Lazy<RwLock<ComponentRegistry>> =
    Lazy::new(|| RwLock::new(ComponentRegistry::new()));

/// A registry mapping component names to constructors.
///
/// Insertion order is preserved so that callers can observe the order in
/// which plugins were loaded.
///
/// # Example
///
/// ```rust
/// use storeplug::component::{Component, ComponentRegistry};
///
/// struct Noop;
///
/// impl Component for Noop {
///     fn name(&self) -> &str {
///         "noop"
///     }
/// }
///
/// fn new_noop() -> Box<dyn Component> {
///     Box::new(Noop)
/// }
///
/// let mut registry = ComponentRegistry::new();
/// registry.add("noop", new_noop).unwrap();
///
/// assert!(registry.contains("noop"));
/// assert!(registry.add("noop", new_noop).is_err());
///
/// let component = registry.instantiate("noop").unwrap();
/// assert_eq!(component.name(), "noop");
/// ```
#[derive(Debug)]
pub struct ComponentRegistry {
    /// Registered components in insertion order.
    entries: Vec<(String, ComponentConstructor)>,

    /// Map from component name to its position in `entries`.
    index: HashMap<String, usize>,

    sealed: bool,
}

impl ComponentRegistry {
    /// Create a new empty, unsealed registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            sealed: false,
        }
    }

    /// Register a component constructor under `name`.
    ///
    /// # Errors
    /// - `RegistryError::EmptyName` if `name` is empty
    /// - `RegistryError::Duplicate` if `name` is already registered; the
    ///   existing entry is left untouched
    /// - `RegistryError::Sealed` if the registry has been sealed
    pub fn add(
        &mut self,
        name: impl Into<String>,
        constructor: ComponentConstructor,
    ) -> Result<(), RegistryError> {
        let name = name.into();

        if self.sealed {
            return Err(RegistryError::Sealed(name));
        }
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.index.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }

        debug!(component = %name, position = self.entries.len(), "Registered component");
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, constructor));
        Ok(())
    }

    /// Get the constructor registered under `name`.
    pub fn get(&self, name: &str) -> Option<ComponentConstructor> {
        self.index.get(name).map(|&i| self.entries[i].1)
    }

    /// Build a fresh instance of the component registered under `name`.
    pub fn instantiate(&self, name: &str) -> Option<Box<dyn Component>> {
        self.get(name).map(|constructor| constructor())
    }

    /// Check whether a component is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registered names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Get the number of registered components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no components are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stop accepting insertions. Idempotent.
    pub fn seal(&mut self) {
        if !self.sealed {
            info!(components = self.entries.len(), "Component registry sealed");
        }
        self.sealed = true;
    }

    /// Whether the registry has been sealed.
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide component registry.
pub fn global() -> &'static RwLock<ComponentRegistry> {
    &GLOBAL_REGISTRY
}

/// Register a component in the process-wide registry.
pub fn add_component(
    name: impl Into<String>,
    constructor: ComponentConstructor,
) -> Result<(), RegistryError> {
    global()
        .write()
        .map_err(|_| RegistryError::Poisoned)?
        .add(name, constructor)
}

/// Seal the process-wide registry once startup registration is finished.
pub fn seal_global() -> Result<(), RegistryError> {
    global()
        .write()
        .map_err(|_| RegistryError::Poisoned)?
        .seal();
    Ok(())
}
