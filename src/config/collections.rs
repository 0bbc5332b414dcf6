//! Collection config living inside the content root (`config.toml`).
//!
//! Declares the collections a project expects and, optionally, a schema per
//! collection. Only the presence of a schema matters here: it switches the
//! generated entry data type from `any` to the inferred schema type.
//!
//! ```toml
//! [collections.blog]
//! schema = { title = "string", date = "date" }
//!
//! [collections.authors]   # declared, untyped
//! ```

use super::error::ConfigError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

/// One declared collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfig {
    #[serde(default)]
    pub schema: Option<toml::Table>,
}

impl CollectionConfig {
    pub const fn has_schema(&self) -> bool {
        self.schema.is_some()
    }
}

/// Parsed collection config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentConfig {
    #[serde(default)]
    pub collections: BTreeMap<String, CollectionConfig>,
}

impl ContentConfig {
    /// Parse from TOML text; `path` is only used for error reporting.
    pub fn from_str(content: &str, path: &Path) -> Result<Self> {
        let config = toml::from_str(content)
            .map_err(|err| ConfigError::Toml(path.to_path_buf(), err))?;
        Ok(config)
    }

    /// Whether `name` is declared with a schema.
    pub fn has_schema(&self, name: &str) -> bool {
        self.collections
            .get(name)
            .is_some_and(CollectionConfig::has_schema)
    }
}

/// Loads the collection config on demand.
///
/// `Ok(None)` means no config exists; `Err` means it exists but is broken.
pub trait ConfigLoader: Send + Sync {
    fn load(&self) -> Result<Option<ContentConfig>>;
}

/// Reads and parses the collection config file from disk.
#[derive(Debug, Clone)]
pub struct TomlConfigLoader {
    path: PathBuf,
}

impl TomlConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConfigLoader for TomlConfigLoader {
    fn load(&self) -> Result<Option<ContentConfig>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)
            .map_err(|err| ConfigError::Io(self.path.clone(), err))?;
        ContentConfig::from_str(&content, &self.path).map(Some)
    }
}
