//! Components and the shapes plugins use to hand them to the host.
//!
//! A component is one stage of the storage service (a caching layer, a
//! backend, a stream transformer). Built-in components and plugin components
//! both end up in the [`ComponentRegistry`] as a name and a constructor; the
//! host instantiates them later by name.

pub mod registry;

pub use registry::{add_component, global, seal_global, ComponentRegistry};

use crate::error::Result;

/// Where a component sits in the processing pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentPriority {
    /// Sits closest to the filesystem surface and produces requests.
    Producer,
    /// Intermediate layer (caches, transformers).
    #[default]
    LevelMid,
    /// Terminal layer that talks to the storage backend.
    Consumer,
}

/// A pluggable stage of the storage service.
///
/// Plugins implement this trait and expose a constructor through
/// [`export_component!`](crate::export_component).
pub trait Component: Send {
    /// Name the component was registered under.
    fn name(&self) -> &str;

    /// Pipeline position. Defaults to [`ComponentPriority::LevelMid`].
    fn priority(&self) -> ComponentPriority {
        ComponentPriority::LevelMid
    }

    /// Start the component.
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Stop the component.
    fn stop(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Zero-argument constructor stored in the registry and invoked lazily.
pub type ComponentConstructor = fn() -> Box<dyn Component>;

/// What a plugin factory returns: the registry key and its constructor.
pub type ExternalComponent = (String, ComponentConstructor);

/// The exported plugin factory.
pub type FactoryFn = fn() -> ExternalComponent;
