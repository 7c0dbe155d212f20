//! Native module loading.
//!
//! Opens shared objects with `libloading` and exposes the two symbols the
//! plugin contract defines. Everything above this module talks to the
//! [`ModuleOpener`] / [`LoadedModule`] traits so the pipeline can run
//! against in-memory modules in tests.

use std::ffi::CStr;
use std::path::Path;
use std::sync::Mutex;

use libloading::Library;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::component::FactoryFn;
use crate::error::PluginError;

use super::signature::{SignatureFn, FACTORY_SYMBOL, SIGNATURE_SYMBOL};

/// Dynamic-library suffix for the current platform (`.so`, `.dylib`, `.dll`).
pub const LIBRARY_SUFFIX: &str = std::env::consts::DLL_SUFFIX;

/// Libraries whose components were registered. Never dropped: constructors
/// in the registry point into their code.
static RESIDENT_LIBRARIES: Lazy<Mutex<Vec<Library>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Opens a plugin file into a [`LoadedModule`].
#[cfg_attr(test, mockall::automock)]
pub trait ModuleOpener {
    /// Open the binary object at `path`. Any failure is fatal.
    fn open(&self, path: &Path) -> Result<Box<dyn LoadedModule>, PluginError>;
}

/// A loaded binary object with symbol lookup.
pub trait LoadedModule {
    /// Resolve the factory symbol. `Err` carries the loader's reason.
    ///
    /// The returned pointer must not be called before the signature has been
    /// verified.
    fn lookup_factory(&self) -> Result<FactoryFn, String>;

    /// Read the factory signature declaration, `None` if the plugin does not
    /// export one.
    fn lookup_signature(&self) -> Option<String>;

    /// Keep the module mapped for the rest of the process.
    fn keep_resident(self: Box<Self>) {}
}

/// Whether `path` ends with the platform dynamic-library suffix.
pub fn has_library_suffix(path: &str) -> bool {
    path.ends_with(LIBRARY_SUFFIX)
}

/// Reject paths that cannot be plugins. The resulting error is skippable.
pub fn check_suffix(path: &str) -> Result<(), PluginError> {
    if has_library_suffix(path) {
        Ok(())
    } else {
        Err(PluginError::InvalidSuffix {
            path: path.to_string(),
            expected: LIBRARY_SUFFIX,
        })
    }
}

/// [`ModuleOpener`] backed by the platform loader (`dlopen` / `LoadLibrary`).
#[derive(Debug, Clone, Copy, Default)]
pub struct LibraryOpener;

impl ModuleOpener for LibraryOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn LoadedModule>, PluginError> {
        // SAFETY: opening a library runs its static initializers. Plugins on
        // the configured path are trusted by the operator.
        let library = unsafe { Library::new(path) }.map_err(|e| PluginError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        debug!(plugin = %path.display(), "Opened shared object");
        Ok(Box::new(LibraryModule { library }))
    }
}

struct LibraryModule {
    library: Library,
}

impl LoadedModule for LibraryModule {
    fn lookup_factory(&self) -> Result<FactoryFn, String> {
        // SAFETY: only the address is read here. The pointer is called after
        // the signature declaration matched, and the library is kept resident
        // from then on.
        unsafe { self.library.get::<FactoryFn>(FACTORY_SYMBOL.as_bytes()) }
            .map(|symbol| *symbol)
            .map_err(|e| e.to_string())
    }

    fn lookup_signature(&self) -> Option<String> {
        // SAFETY: the declaration is a plain C function returning a pointer to
        // a static NUL-terminated string; it involves no Rust types.
        unsafe {
            let declare = self
                .library
                .get::<SignatureFn>(SIGNATURE_SYMBOL.as_bytes())
                .ok()?;
            let ptr = declare();
            if ptr.is_null() {
                return Some(String::new());
            }
            Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
        }
    }

    fn keep_resident(self: Box<Self>) {
        RESIDENT_LIBRARIES
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(self.library);
    }
}

/// In-memory module with a configurable symbol table.
#[cfg(test)]
pub(crate) struct FakeModule {
    pub(crate) factory: Option<FactoryFn>,
    pub(crate) signature: Option<String>,
    pub(crate) resident: Option<std::sync::Arc<std::sync::atomic::AtomicUsize>>,
}

#[cfg(test)]
impl FakeModule {
    /// Exports `factory` and declares the host's own signature.
    pub(crate) fn valid(factory: FactoryFn) -> Box<dyn LoadedModule> {
        Box::new(Self::with_symbols(
            Some(factory),
            Some(super::signature::factory_signature().to_string()),
        ))
    }

    pub(crate) fn with_symbols(factory: Option<FactoryFn>, signature: Option<String>) -> Self {
        Self {
            factory,
            signature,
            resident: None,
        }
    }
}

#[cfg(test)]
impl LoadedModule for FakeModule {
    fn lookup_factory(&self) -> Result<FactoryFn, String> {
        self.factory
            .ok_or_else(|| format!("undefined symbol: {}", FACTORY_SYMBOL))
    }

    fn lookup_signature(&self) -> Option<String> {
        self.signature.clone()
    }

    fn keep_resident(self: Box<Self>) {
        if let Some(counter) = &self.resident {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        }
    }
}

#[cfg(all(test, target_os = "linux", target_env = "gnu"))]
fn resident_library_count() -> usize {
    RESIDENT_LIBRARIES
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .len()
}
