//! Binder configuration (e.g., `tern-bind.toml`)

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for one binding session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BinderConfig {
    /// Start package loads in the background as soon as an import is seen
    pub eager_loading: bool,

    /// Import path of the foreign-function pseudo package
    pub foreign_package_path: String,

    /// Name the foreign-function pseudo package is always bound under
    pub foreign_package_name: String,

    /// Importer path to the base that its relative imports are resolved
    /// against, replacing the importer path itself
    pub import_redirects: IndexMap<String, String>,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            eager_loading: true,
            foreign_package_path: "C".to_owned(),
            foreign_package_name: "C".to_owned(),
            import_redirects: IndexMap::new(),
        }
    }
}

impl BinderConfig {
    /// Parse a configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse binder configuration")
    }

    /// Load a configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read binder configuration: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse binder configuration: {}", path.display()))
    }

    /// Enable or disable background loading
    #[must_use]
    pub fn with_eager_loading(mut self, eager: bool) -> Self {
        self.eager_loading = eager;
        self
    }

    /// Resolve relative imports of `importer` against `base`
    #[must_use]
    pub fn with_redirect(mut self, importer: impl Into<String>, base: impl Into<String>) -> Self {
        self.import_redirects.insert(importer.into(), base.into());
        self
    }

    /// Treat `importer` as a test double: its relative imports resolve against
    /// its parent directory
    #[must_use]
    pub fn with_test_double(self, importer: &str) -> Self {
        let base = importer.rsplit_once('/').map_or(".", |(parent, _)| parent).to_owned();
        self.with_redirect(importer, base)
    }

    /// Base path for relative imports made by `importer`
    pub fn relative_base<'a>(&'a self, importer: &'a str) -> &'a str {
        self.import_redirects
            .get(importer)
            .map_or(importer, String::as_str)
    }
}
