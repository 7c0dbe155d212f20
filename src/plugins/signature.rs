//! Factory symbol contract and its verification.
//!
//! A plugin exports two symbols:
//!
//! - `GetExternalComponent`: Rust ABI, `fn() -> (String, fn() -> Box<dyn Component>)`.
//! - `GetExternalComponentSignature`: C ABI, `extern "C" fn() -> *const c_char`,
//!   returning the signature string the plugin was compiled against.
//!
//! Symbol tables carry no type information, so the second symbol is what the
//! host checks before calling the first. The signature names the ABI
//! revision, the `storeplug` version and the compiler version, since any of
//! them changing can change the layout of the types crossing the boundary.
//! Use [`export_component!`](crate::export_component) to generate both.
//!
//! A plugin links its own copy of `std`, so a panic escaping
//! `GetExternalComponent` cannot be caught by the host and aborts the
//! process. The generated factory catches panics on the plugin side and
//! returns an empty component name instead, which the registry rejects.

use std::os::raw::c_char;
use std::panic::{self, UnwindSafe};

use tracing::debug;

use crate::component::FactoryFn;
use crate::error::PluginError;

use super::native::LoadedModule;

/// Name of the exported factory function.
pub const FACTORY_SYMBOL: &str = "GetExternalComponent";

/// Name of the exported signature declaration.
pub const SIGNATURE_SYMBOL: &str = "GetExternalComponentSignature";

/// Type of the signature declaration symbol.
pub type SignatureFn = unsafe extern "C" fn() -> *const c_char;

#[doc(hidden)]
pub const FACTORY_SIGNATURE_NUL: &str = concat!(
    "storeplug-abi/1 storeplug/",
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("STOREPLUG_RUSTC_VERSION"),
    ") fn() -> (String, fn() -> Box<dyn Component>)\0"
);

/// The signature a plugin must declare to be accepted by this host.
pub fn factory_signature() -> &'static str {
    FACTORY_SIGNATURE_NUL.trim_end_matches('\0')
}

/// Evaluate a component name inside the plugin, turning a panic into `""`.
///
/// Runs in the plugin's copy of this crate, where unwinding still works.
#[doc(hidden)]
pub fn catch_component_name<F>(name: F) -> String
where
    F: FnOnce() -> String + UnwindSafe,
{
    panic::catch_unwind(name).unwrap_or_default()
}

/// Resolve the factory symbol of `module` and verify its declared signature.
///
/// # Errors
/// - `PluginError::SymbolNotFound` if `GetExternalComponent` is not exported
/// - `PluginError::SignatureMismatch` if the signature declaration is missing
///   or differs from [`factory_signature`]
pub fn resolve_factory(module: &dyn LoadedModule, path: &str) -> Result<FactoryFn, PluginError> {
    let factory = module
        .lookup_factory()
        .map_err(|reason| PluginError::SymbolNotFound {
            path: path.to_string(),
            symbol: FACTORY_SYMBOL,
            reason,
        })?;

    let expected = factory_signature();
    match module.lookup_signature() {
        Some(found) if found == expected => {
            debug!(plugin = %path, "Factory signature verified");
            Ok(factory)
        }
        found => Err(PluginError::SignatureMismatch {
            path: path.to_string(),
            symbol: FACTORY_SYMBOL,
            expected: expected.to_string(),
            found,
        }),
    }
}

/// Export a component factory from a plugin crate built as a `cdylib`.
///
/// `$name` is evaluated each time the host calls the factory. If it panics,
/// the factory returns an empty name and the host fails the load with a
/// registration error for this plugin.
///
/// ```rust,ignore
/// use storeplug::component::Component;
///
/// struct ReadAhead;
///
/// impl Component for ReadAhead {
///     fn name(&self) -> &str {
///         "read_ahead"
///     }
/// }
///
/// fn new_read_ahead() -> Box<dyn Component> {
///     Box::new(ReadAhead)
/// }
///
/// storeplug::export_component!("read_ahead", new_read_ahead);
/// ```
#[macro_export]
macro_rules! export_component {
    ($name:expr, $constructor:path) => {
        #[no_mangle]
        #[allow(non_snake_case)]
        pub fn GetExternalComponent() -> $crate::component::ExternalComponent {
            let name = $crate::plugins::signature::catch_component_name(|| {
                ::std::string::String::from($name)
            });
            (name, $constructor as $crate::component::ComponentConstructor)
        }

        #[no_mangle]
        #[allow(non_snake_case)]
        pub extern "C" fn GetExternalComponentSignature() -> *const ::std::os::raw::c_char {
            $crate::plugins::signature::FACTORY_SIGNATURE_NUL
                .as_ptr()
                .cast()
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Component, ComponentConstructor, ExternalComponent};
    use crate::plugins::native::FakeModule;
    use std::ffi::CStr;

    struct Cache;

    impl Component for Cache {
        fn name(&self) -> &str {
            "cacheX"
        }
    }

    fn new_cache() -> Box<dyn Component> {
        Box::new(Cache)
    }

    fn cache_factory() -> ExternalComponent {
        ("cacheX".to_string(), new_cache as ComponentConstructor)
    }

    mod exported {
        crate::export_component!("cacheX", super::new_cache);
    }

    #[test]
    fn test_signature_names_shape_and_versions() {
        let sig = factory_signature();
        assert!(sig.starts_with("storeplug-abi/1"));
        assert!(sig.contains(env!("CARGO_PKG_VERSION")));
        assert!(sig.contains("fn() -> (String, fn() -> Box<dyn Component>)"));
        assert!(!sig.contains('\0'));
        assert!(FACTORY_SIGNATURE_NUL.ends_with('\0'));
    }

    #[test]
    fn test_resolve_factory_accepts_matching_signature() {
        let module =
            FakeModule::with_symbols(Some(cache_factory), Some(factory_signature().to_string()));
        let factory = resolve_factory(&module, "/p/a.so").unwrap();
        let (name, constructor) = factory();
        assert_eq!(name, "cacheX");
        assert_eq!(constructor().name(), "cacheX");
    }

    #[test]
    fn test_missing_factory_is_symbol_not_found() {
        let module = FakeModule::with_symbols(None, Some(factory_signature().to_string()));
        let err = resolve_factory(&module, "/p/a.so").unwrap_err();
        assert!(matches!(err, PluginError::SymbolNotFound { .. }));
        assert!(err.to_string().contains("function lookup error"));
        assert!(err.to_string().contains("undefined symbol"));
    }

    #[test]
    fn test_missing_declaration_is_signature_mismatch() {
        let module = FakeModule::with_symbols(Some(cache_factory), None);
        let err = resolve_factory(&module, "/p/a.so").unwrap_err();
        assert!(matches!(
            err,
            PluginError::SignatureMismatch { found: None, .. }
        ));
    }

    #[test]
    fn test_wrong_declaration_is_signature_mismatch() {
        let module = FakeModule::with_symbols(
            Some(cache_factory),
            Some("storeplug-abi/0 fn() -> String".to_string()),
        );
        let err = resolve_factory(&module, "/p/a.so").unwrap_err();
        match &err {
            PluginError::SignatureMismatch {
                expected, found, ..
            } => {
                assert_eq!(expected, factory_signature());
                assert_eq!(found.as_deref(), Some("storeplug-abi/0 fn() -> String"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("incorrect definition"));
        assert!(!err.to_string().contains("function lookup error"));
    }

    #[test]
    fn test_missing_factory_reported_before_signature() {
        let module = FakeModule::with_symbols(None, None);
        let err = resolve_factory(&module, "/p/a.so").unwrap_err();
        assert!(matches!(err, PluginError::SymbolNotFound { .. }));
    }

    #[test]
    fn test_export_macro_generates_contract() {
        let (name, constructor) = exported::GetExternalComponent();
        assert_eq!(name, "cacheX");
        assert_eq!(constructor().name(), "cacheX");

        let declared = unsafe { CStr::from_ptr(exported::GetExternalComponentSignature()) };
        assert_eq!(declared.to_str().unwrap(), factory_signature());

        // The generated function has exactly the factory type.
        let _: FactoryFn = exported::GetExternalComponent;
    }

    #[test]
    fn test_component_name_panic_becomes_empty_name() {
        let name = catch_component_name(|| panic!("name lookup failed"));
        assert_eq!(name, "");

        let name = catch_component_name(|| "cacheX".to_string());
        assert_eq!(name, "cacheX");
    }
}
