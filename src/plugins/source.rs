//! Plugin source resolution.

use std::slice::Iter;

/// Separator between entries of the plugin list.
pub const PATH_DELIMITER: char = ':';

/// Ordered plugin paths taken from one delimited configuration value.
///
/// No validation happens here: malformed entries are reported (and skipped)
/// by the loader so the remaining entries still get a chance to load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginDescriptor {
    paths: Vec<String>,
}

impl PluginDescriptor {
    /// Split a raw plugin list on `:`. An empty string yields no paths.
    pub fn resolve(raw: &str) -> Self {
        if raw.is_empty() {
            return Self::default();
        }
        Self {
            paths: raw.split(PATH_DELIMITER).map(str::to_string).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn iter(&self) -> Iter<'_, String> {
        self.paths.iter()
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }
}

impl<'a> IntoIterator for &'a PluginDescriptor {
    type Item = &'a String;
    type IntoIter = Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}
