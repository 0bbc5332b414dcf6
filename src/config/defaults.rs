//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn content() -> PathBuf {
        "src/content".into()
    }

    pub fn cache() -> PathBuf {
        ".contentmap".into()
    }

    pub fn template() -> Option<PathBuf> {
        None
    }
}

// ============================================================================
// [content] Section Defaults
// ============================================================================

pub mod content {
    use super::super::EntryTypeConfig;
    use std::path::PathBuf;

    pub fn config_file() -> PathBuf {
        "config.toml".into()
    }

    pub fn data_extensions() -> Vec<String> {
        [".json", ".yaml", ".yml"].map(String::from).to_vec()
    }

    pub fn entry_types() -> Vec<EntryTypeConfig> {
        vec![EntryTypeConfig {
            extensions: [".md", ".markdown", ".mdown", ".mkdn", ".mkd", ".mdwn"]
                .map(String::from)
                .to_vec(),
            module_types: None,
        }]
    }
}

// ============================================================================
// [watch] Section Defaults
// ============================================================================

pub mod watch {
    pub fn debounce_ms() -> u64 {
        50
    }
}
