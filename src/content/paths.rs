//! Resolved locations of everything the content pipeline reads or writes.

use super::CONTENT_TYPES_FILE;
use crate::config::Settings;
use std::path::{Component, Path, PathBuf};

/// Absolute paths derived from [`Settings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPaths {
    /// Project root.
    pub root: PathBuf,
    /// Content root; every immediate subdirectory is a collection.
    pub content_dir: PathBuf,
    /// Data entries live beside content entries.
    pub data_dir: PathBuf,
    /// Directory receiving the generated declarations.
    pub cache_dir: PathBuf,
    /// Collection config file.
    pub config: PathBuf,
    pub types_template: Option<PathBuf>,
    pub virtual_mod_template: Option<PathBuf>,
}

impl ContentPaths {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            root: settings.get_root().to_path_buf(),
            content_dir: settings.build.content.clone(),
            data_dir: settings.build.content.clone(),
            cache_dir: settings.build.cache.clone(),
            config: settings.content_config_path(),
            types_template: settings.build.types_template.clone(),
            virtual_mod_template: settings.build.virtual_mod_template.clone(),
        }
    }

    /// Location of the generated type declarations.
    pub fn types_file(&self) -> PathBuf {
        self.cache_dir.join(CONTENT_TYPES_FILE)
    }
}

/// Join path components with `/`, whatever the platform separator is.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// `/`-prefixed path of `path` relative to `root`.
///
/// Directories get a trailing slash so globs can be appended directly:
/// `/proj/src/content` → `/src/content/`.
pub fn root_relative_path(root: &Path, path: &Path, is_dir: bool) -> String {
    let rel = to_slash(path.strip_prefix(root).unwrap_or(path));
    let rel = rel.trim_start_matches('/');
    match (rel.is_empty(), is_dir) {
        (true, _) => "/".to_owned(),
        (false, true) => format!("/{rel}/"),
        (false, false) => format!("/{rel}"),
    }
}

/// Relative path from directory `from` to `to`. Both must be absolute.
///
/// `relative_path("/p/.cache", "/p/src/content/config.toml")` →
/// `../src/content/config.toml`
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = to.components().collect();

    let common = from
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count();

    let mut result = PathBuf::new();
    for _ in common..from.len() {
        result.push("..");
    }
    for component in &to[common..] {
        result.push(component.as_os_str());
    }
    result
}
