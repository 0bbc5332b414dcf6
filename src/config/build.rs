//! `[build]` section configuration.
//!
//! Project layout: where content lives and where generated files go.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in contentmap.toml.
///
/// # Example
/// ```toml
/// [build]
/// content = "src/content"   # Content root, one collection per subdirectory
/// cache = ".contentmap"     # Generated `types.d.ts` lands here
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Content root directory.
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Cache directory for generated type declarations.
    #[serde(default = "defaults::build::cache")]
    #[educe(Default = defaults::build::cache())]
    pub cache: PathBuf,

    /// Override for the embedded type declaration template.
    #[serde(default = "defaults::build::template")]
    #[educe(Default = defaults::build::template())]
    pub types_template: Option<PathBuf>,

    /// Override for the embedded virtual module template.
    #[serde(default = "defaults::build::template")]
    #[educe(Default = defaults::build::template())]
    pub virtual_mod_template: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::super::Settings;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_defaults() {
        let settings: Settings = toml::from_str("").unwrap();

        assert_eq!(settings.build.content, PathBuf::from("src/content"));
        assert_eq!(settings.build.cache, PathBuf::from(".contentmap"));
        assert!(settings.build.types_template.is_none());
        assert!(settings.build.virtual_mod_template.is_none());
    }

    #[test]
    fn test_build_config_custom() {
        let settings: Settings = toml::from_str(
            r#"
            [build]
            content = "docs"
            cache = ".cache"
            types_template = "tpl/types.d.ts"
        "#,
        )
        .unwrap();

        assert_eq!(settings.build.content, PathBuf::from("docs"));
        assert_eq!(settings.build.cache, PathBuf::from(".cache"));
        assert_eq!(
            settings.build.types_template,
            Some(PathBuf::from("tpl/types.d.ts"))
        );
    }

    #[test]
    fn test_build_config_unknown_field_rejected() {
        let result: Result<Settings, _> = toml::from_str(
            r#"
            [build]
            output = "public"
        "#,
        );
        assert!(result.is_err());
    }
}
