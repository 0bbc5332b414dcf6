//! `[content]` section configuration.
//!
//! Which file extensions are content entries, which are data entries, and
//! where the collection config lives inside the content root.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A content entry type: a set of extensions rendered the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryTypeConfig {
    /// Extensions including the leading dot, e.g. `".md"`.
    pub extensions: Vec<String>,

    /// Declaration fragment prepended to the generated types file.
    #[serde(default)]
    pub module_types: Option<String>,
}

/// `[content]` section in contentmap.toml.
///
/// # Example
/// ```toml
/// [content]
/// data_extensions = [".json", ".yaml"]
/// ignore_images = true
///
/// [[content.entry_types]]
/// extensions = [".md"]
///
/// [[content.entry_types]]
/// extensions = [".mdoc"]
/// module_types = "declare module 'virtual:content' { interface Render { '.mdoc': Promise<RenderResult> } }"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct ContentSettings {
    /// Collection config file name, relative to the content root.
    #[serde(default = "defaults::content::config_file")]
    #[educe(Default = defaults::content::config_file())]
    pub config_file: PathBuf,

    /// Extensions classified as data entries.
    #[serde(default = "defaults::content::data_extensions")]
    #[educe(Default = defaults::content::data_extensions())]
    pub data_extensions: Vec<String>,

    /// Treat image files inside the content root as ignored.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub ignore_images: bool,

    /// Registered content entry types.
    #[serde(default = "defaults::content::entry_types")]
    #[educe(Default = defaults::content::entry_types())]
    pub entry_types: Vec<EntryTypeConfig>,
}

impl ContentSettings {
    /// All registered content extensions, in declaration order.
    pub fn content_extensions(&self) -> impl Iterator<Item = &str> {
        self.entry_types
            .iter()
            .flat_map(|t| t.extensions.iter().map(String::as_str))
    }
}
