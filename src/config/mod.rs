//! Loader configuration.
//!
//! The plugin list is a single colon-separated value, read from
//! `STOREPLUG_PLUGIN_PATH` unless the host supplies one explicitly. Unset and
//! empty both mean "no plugins".

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreplugError};

/// Environment variable holding the colon-separated plugin list.
///
/// Example: `STOREPLUG_PLUGIN_PATH="/path/to/plugin1.so:/path/to/plugin2.so"`
pub const PLUGIN_PATH_ENV: &str = "STOREPLUG_PLUGIN_PATH";

/// Plugin loader configuration, embeddable in a host's own config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Colon-separated list of shared-object paths. `None` and `""` disable
    /// plugin loading.
    pub plugin_path: Option<String>,
}

impl LoaderConfig {
    /// Create a config with an explicit plugin list.
    pub fn with_plugin_path(plugin_path: impl Into<String>) -> Self {
        Self {
            plugin_path: Some(plugin_path.into()),
        }
    }

    /// Read the plugin list from [`PLUGIN_PATH_ENV`].
    pub fn from_env() -> Result<Self> {
        Self::from_env_var(PLUGIN_PATH_ENV)
    }

    /// Read the plugin list from the named environment variable.
    ///
    /// # Errors
    /// `StoreplugError::Config` if the variable is set but not valid unicode.
    pub fn from_env_var(var: &str) -> Result<Self> {
        match std::env::var(var) {
            Ok(value) => Ok(Self {
                plugin_path: Some(value),
            }),
            Err(std::env::VarError::NotPresent) => Ok(Self::default()),
            Err(std::env::VarError::NotUnicode(_)) => Err(StoreplugError::Config(format!(
                "{} is not valid unicode",
                var
            ))),
        }
    }

    /// Apply a CLI override on top of this config.
    pub fn merge_override(mut self, plugin_path: Option<String>) -> Self {
        if plugin_path.is_some() {
            self.plugin_path = plugin_path;
        }
        self
    }

    /// The raw plugin list, `""` when unset.
    pub fn raw_plugin_path(&self) -> &str {
        self.plugin_path.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let config = LoaderConfig::default();
        assert_eq!(config.plugin_path, None);
        assert_eq!(config.raw_plugin_path(), "");
    }

    #[test]
    fn test_from_env_var_unset() {
        let config = LoaderConfig::from_env_var("STOREPLUG_TEST_UNSET_PLUGIN_PATH").unwrap();
        assert_eq!(config, LoaderConfig::default());
    }

    #[test]
    fn test_from_env_var_set() {
        std::env::set_var("STOREPLUG_TEST_SET_PLUGIN_PATH", "/p/a.so:/p/b.so");
        let config = LoaderConfig::from_env_var("STOREPLUG_TEST_SET_PLUGIN_PATH").unwrap();
        assert_eq!(config.raw_plugin_path(), "/p/a.so:/p/b.so");
        std::env::remove_var("STOREPLUG_TEST_SET_PLUGIN_PATH");
    }

    #[test]
    fn test_merge_override() {
        let base = LoaderConfig::with_plugin_path("/p/a.so");

        let kept = base.clone().merge_override(None);
        assert_eq!(kept.raw_plugin_path(), "/p/a.so");

        let replaced = base.merge_override(Some("/q/b.so".to_string()));
        assert_eq!(replaced.raw_plugin_path(), "/q/b.so");
    }

    #[test]
    fn test_deserialize_from_host_config() {
        let config: LoaderConfig =
            serde_json::from_str(r#"{"plugin_path": "/p/a.so:/p/b.so"}"#).unwrap();
        assert_eq!(config.raw_plugin_path(), "/p/a.so:/p/b.so");

        let empty: LoaderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, LoaderConfig::default());
    }
}
