//! Project settings (`contentmap.toml`) and the collection config state.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[build]`   | Content root, cache directory, template overrides|
//! | `[content]` | Entry types, data extensions, config file name   |
//! | `[watch]`   | Watcher toggle and debounce period               |
//!
//! # Example
//!
//! ```toml
//! [build]
//! content = "src/content"
//! cache = ".contentmap"
//!
//! [content]
//! data_extensions = [".json", ".yaml"]
//!
//! [watch]
//! debounce_ms = 50
//! ```
//!
//! The collection config (`<content>/config.toml`) is a different file owned by
//! the user's content; see [`collections`] and [`handle`].

mod build;
pub mod collections;
mod content;
pub mod defaults;
mod error;
pub mod handle;
mod watch;

pub use collections::{ConfigLoader, ContentConfig, TomlConfigLoader};
pub use content::{ContentSettings, EntryTypeConfig};
pub use error::ConfigError;
pub use handle::{ConfigObserver, ConfigState};

use build::BuildConfig;
use watch::WatchConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing contentmap.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Absolute path to the settings file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project layout
    #[serde(default)]
    pub build: BuildConfig,

    /// Entry classification
    #[serde(default)]
    pub content: ContentSettings,

    /// Live regeneration
    #[serde(default)]
    pub watch: WatchConfig,
}

impl Settings {
    /// Parse configuration from TOML string
    #[cfg(test)]
    pub fn from_str(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        Ok(settings)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        let settings =
            toml::from_str(&content).map_err(|err| ConfigError::Toml(path.to_path_buf(), err))?;
        Ok(settings)
    }

    /// Load settings for a CLI invocation.
    ///
    /// A missing settings file is not an error: every field has a default.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut settings = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        settings.config_path = normalize_path(&config_path);
        settings.update_with_cli(cli);
        settings.validate()?;

        Ok(settings)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf());
    }

    /// Absolute path of the collection config file.
    pub fn content_config_path(&self) -> PathBuf {
        self.build.content.join(&self.content.config_file)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());

        update_option(&mut self.build.content, cli.content.as_ref());
        if let Commands::Watch {
            debounce: Some(ms), ..
        } = &cli.command
        {
            self.watch.debounce_ms = *ms;
        }

        self.update_path_with_root(&root);
    }

    /// Resolve all paths against `root` and normalize them to absolute paths
    fn update_path_with_root(&mut self, root: &Path) {
        let root = normalize_path(root);
        self.set_root(&root);

        self.build.content = normalize_path(&root.join(&self.build.content));
        self.build.cache = normalize_path(&root.join(&self.build.cache));

        if let Some(path) = self.build.types_template.take() {
            self.build.types_template = Some(normalize_path(&root.join(path)));
        }
        if let Some(path) = self.build.virtual_mod_template.take() {
            self.build.virtual_mod_template = Some(normalize_path(&root.join(path)));
        }
    }

    /// Validate settings after CLI overrides have been applied
    pub fn validate(&self) -> Result<()> {
        let content_exts: Vec<_> = self.content.content_extensions().collect();

        if content_exts.is_empty() {
            bail!(ConfigError::Validation(
                "[content.entry_types] must register at least one extension".into()
            ));
        }

        for ext in content_exts
            .iter()
            .copied()
            .chain(self.content.data_extensions.iter().map(String::as_str))
        {
            if !ext.starts_with('.') || ext.len() < 2 {
                bail!(ConfigError::Validation(format!(
                    "extension `{ext}` must start with a dot, e.g. `.md`"
                )));
            }
        }

        if let Some(ext) = self
            .content
            .data_extensions
            .iter()
            .find(|ext| content_exts.contains(&ext.as_str()))
        {
            bail!(ConfigError::Validation(format!(
                "extension `{ext}` is registered as both content and data"
            )));
        }

        if self.content.config_file.components().count() != 1 {
            bail!(ConfigError::Validation(
                "[content.config_file] must be a file name directly inside the content root"
                    .into()
            ));
        }

        if self.watch.debounce_ms == 0 {
            bail!(ConfigError::Validation(
                "[watch.debounce_ms] must be greater than zero".into()
            ));
        }

        Ok(())
    }
}

/// Update config option if CLI value is provided
fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
    if let Some(option) = cli_option {
        *config_option = option.clone();
    }
}

/// Normalize a path to absolute, using canonicalize if the path exists
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        // For non-existent paths, manually make them absolute
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        }
    })
}

// ============================================================================
// Tests
// ============================================================================
