//! Frontmatter splitting and the few fields the pipeline reads from it.
//!
//! Only the `slug` key matters here; the rest of the frontmatter belongs to
//! whoever renders the entry.

use super::error::ContentError;
use anyhow::Result;
use std::path::Path;

/// Delimiter types for frontmatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFormat {
    /// YAML frontmatter delimited by `---`.
    Yaml,
    /// TOML frontmatter delimited by `+++`.
    Toml,
}

impl FrontmatterFormat {
    pub const fn delimiter(self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

/// The `slug` key as found in frontmatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterSlug {
    /// No frontmatter, or no `slug` key.
    Missing,
    Slug(String),
    /// Present but not a string; carries the type that was found.
    Invalid(&'static str),
}

/// Split content into `(format, frontmatter, body)`.
///
/// The opening delimiter must be the first line and the closing delimiter
/// must sit on a line of its own.
pub fn split_frontmatter(content: &str) -> Option<(FrontmatterFormat, &str, &str)> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let format = if content.starts_with("---") {
        FrontmatterFormat::Yaml
    } else if content.starts_with("+++") {
        FrontmatterFormat::Toml
    } else {
        return None;
    };
    let delimiter = format.delimiter();

    let rest = &content[delimiter.len()..];
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == delimiter {
            return Some((format, &rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }

    None
}

/// Read the `slug` key from the frontmatter of `content`.
pub fn read_slug(content: &str, path: &Path) -> Result<FrontmatterSlug> {
    let Some((format, raw, _)) = split_frontmatter(content) else {
        return Ok(FrontmatterSlug::Missing);
    };
    if raw.trim().is_empty() {
        return Ok(FrontmatterSlug::Missing);
    }

    let frontmatter_error = |message: String| ContentError::Frontmatter {
        path: path.to_path_buf(),
        message,
    };

    let slug = match format {
        FrontmatterFormat::Yaml => {
            let value: serde_yaml_ng::Value =
                serde_yaml_ng::from_str(raw).map_err(|e| frontmatter_error(e.to_string()))?;
            match value.get("slug") {
                None | Some(serde_yaml_ng::Value::Null) => FrontmatterSlug::Missing,
                Some(serde_yaml_ng::Value::String(s)) => FrontmatterSlug::Slug(s.clone()),
                Some(other) => FrontmatterSlug::Invalid(yaml_type_name(other)),
            }
        }
        FrontmatterFormat::Toml => {
            let table: toml::Table =
                toml::from_str(raw).map_err(|e| frontmatter_error(e.to_string()))?;
            match table.get("slug") {
                None => FrontmatterSlug::Missing,
                Some(toml::Value::String(s)) => FrontmatterSlug::Slug(s.clone()),
                Some(other) => FrontmatterSlug::Invalid(other.type_str()),
            }
        }
    };

    Ok(slug)
}

fn yaml_type_name(value: &serde_yaml_ng::Value) -> &'static str {
    use serde_yaml_ng::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
