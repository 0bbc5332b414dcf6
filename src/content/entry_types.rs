//! Registry of content entry types, keyed by file extension.

use crate::config::{ContentSettings, EntryTypeConfig};
use rustc_hash::FxHashMap;
use std::{path::Path, sync::Arc};

/// A registered kind of content entry (markdown, markdoc, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEntryType {
    pub extensions: Vec<String>,
    /// Declaration fragment contributed to the generated types file.
    pub module_types: Option<String>,
}

impl From<&EntryTypeConfig> for ContentEntryType {
    fn from(config: &EntryTypeConfig) -> Self {
        Self {
            extensions: config.extensions.clone(),
            module_types: config.module_types.clone(),
        }
    }
}

/// Lookup from extension (with leading dot) to its entry type.
#[derive(Debug, Clone, Default)]
pub struct EntryTypeRegistry {
    types: Vec<Arc<ContentEntryType>>,
    by_ext: FxHashMap<String, Arc<ContentEntryType>>,
    /// Extensions in registration order, first registration wins.
    exts: Vec<String>,
}

impl EntryTypeRegistry {
    pub fn from_settings(settings: &ContentSettings) -> Self {
        let mut registry = Self::default();
        for config in &settings.entry_types {
            registry.register(ContentEntryType::from(config));
        }
        registry
    }

    pub fn register(&mut self, entry_type: ContentEntryType) {
        let entry_type = Arc::new(entry_type);
        for ext in &entry_type.extensions {
            if !self.by_ext.contains_key(ext) {
                self.by_ext.insert(ext.clone(), Arc::clone(&entry_type));
                self.exts.push(ext.clone());
            }
        }
        self.types.push(entry_type);
    }

    pub fn get(&self, ext: &str) -> Option<&Arc<ContentEntryType>> {
        self.by_ext.get(ext)
    }

    /// Entry type for a file path, by its final extension.
    pub fn for_path(&self, path: &Path) -> Option<&Arc<ContentEntryType>> {
        self.get(&extname(path))
    }

    pub fn extensions(&self) -> &[String] {
        &self.exts
    }

    /// Registered types in registration order.
    pub fn types(&self) -> impl Iterator<Item = &ContentEntryType> {
        self.types.iter().map(AsRef::as_ref)
    }
}

/// Final extension including the dot, or empty: `a/b.test.md` → `.md`.
pub fn extname(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

/// Glob suffix matching any of `exts`.
///
/// A single extension stays bare because `{.md}` is not a valid brace set
/// for most glob engines.
pub fn ext_glob(exts: &[String]) -> String {
    match exts {
        [single] => single.clone(),
        _ => format!("{{{}}}", exts.join(",")),
    }
}
