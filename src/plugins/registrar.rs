//! Hands a verified factory's component to the registry.
//!
//! The factory runs on the plugin's copy of `std`, so the host cannot
//! recover from a panic escaping it. Factories generated by
//! [`export_component!`](crate::export_component) catch panics themselves
//! and hand back an empty name, which the registry refuses.

use tracing::info;

use crate::component::{ComponentRegistry, FactoryFn};
use crate::error::PluginError;

/// Call `factory` and insert the `(name, constructor)` pair it returns.
///
/// The constructor itself is not called. Name validation (non-empty,
/// unique) is left to the registry; a rejection is reported against `path`.
/// Returns the registered component name.
pub fn register(
    factory: FactoryFn,
    path: &str,
    registry: &mut ComponentRegistry,
) -> Result<String, PluginError> {
    info!(plugin = %path, "Calling plugin factory");
    let (name, constructor) = factory();

    registry
        .add(name.clone(), constructor)
        .map_err(|source| PluginError::Registration {
            path: path.to_string(),
            source,
        })?;

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, ComponentConstructor, ExternalComponent};
    use crate::error::RegistryError;
    use crate::plugins::signature::catch_component_name;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    impl Component for Counted {
        fn name(&self) -> &str {
            "counted"
        }
    }

    fn new_counted() -> Box<dyn Component> {
        CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
        Box::new(Counted)
    }

    fn counted_factory() -> ExternalComponent {
        ("counted".to_string(), new_counted as ComponentConstructor)
    }

    fn unnamed_factory() -> ExternalComponent {
        (String::new(), new_counted as ComponentConstructor)
    }

    fn guarded_panicking_factory() -> ExternalComponent {
        let name = catch_component_name(|| panic!("component name unavailable"));
        (name, new_counted as ComponentConstructor)
    }

    #[test]
    fn test_register_inserts_without_constructing() {
        let mut registry = ComponentRegistry::new();
        let before = CONSTRUCTED.load(Ordering::SeqCst);

        let name = register(counted_factory, "/p/a.so", &mut registry).unwrap();

        assert_eq!(name, "counted");
        assert!(registry.contains("counted"));
        assert_eq!(CONSTRUCTED.load(Ordering::SeqCst), before);
    }

    #[test]
    fn test_empty_name_rejected_by_registry() {
        let mut registry = ComponentRegistry::new();
        let err = register(unnamed_factory, "/p/a.so", &mut registry).unwrap_err();

        assert!(matches!(
            err,
            PluginError::Registration {
                source: RegistryError::EmptyName,
                ..
            }
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_name_rejected_by_registry() {
        let mut registry = ComponentRegistry::new();
        register(counted_factory, "/p/a.so", &mut registry).unwrap();

        let err = register(counted_factory, "/p/b.so", &mut registry).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.path(), "/p/b.so");
        assert!(matches!(
            err,
            PluginError::Registration {
                source: RegistryError::Duplicate(_),
                ..
            }
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_caught_name_panic_is_fatal_registration() {
        let mut registry = ComponentRegistry::new();
        let err = register(guarded_panicking_factory, "/p/a.so", &mut registry).unwrap_err();

        assert!(matches!(
            err,
            PluginError::Registration {
                source: RegistryError::EmptyName,
                ..
            }
        ));
        assert!(err.is_fatal());
        assert_eq!(err.path(), "/p/a.so");
        assert!(registry.is_empty());
    }
}
