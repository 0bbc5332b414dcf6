//! Slug generation and resolution.
//!
//! Every content entry gets a slug generated from its path. Entries may
//! override it with a `slug` key in their frontmatter; the [`SlugResolver`]
//! decides which one wins.

use super::{
    error::ContentError,
    frontmatter::{FrontmatterSlug, read_slug},
};
use anyhow::{Context, Result};
use std::{fs, path::Path};

// ============================================================================
// Slugification
// ============================================================================

/// GitHub-style heading slug for one path segment.
///
/// Lowercases, keeps letters, digits, `-` and `_`, turns spaces into `-` and
/// drops everything else. No deduplication.
pub fn github_slug(segment: &str) -> String {
    segment
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ' '))
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}

// ============================================================================
// Resolution
// ============================================================================

/// Everything known about an entry when its slug is resolved.
#[derive(Debug, Clone, Copy)]
pub struct SlugParams<'a> {
    pub id: &'a str,
    pub collection: &'a str,
    pub generated_slug: &'a str,
    pub path: &'a Path,
}

/// Decides the effective slug of a content entry. May read the file.
pub trait SlugResolver: Send + Sync {
    fn resolve(&self, params: &SlugParams<'_>) -> Result<String>;
}

/// Uses the frontmatter `slug` when present, the generated slug otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontmatterSlugResolver;

impl SlugResolver for FrontmatterSlugResolver {
    fn resolve(&self, params: &SlugParams<'_>) -> Result<String> {
        let contents = fs::read_to_string(params.path)
            .with_context(|| format!("Failed to read {}", params.path.display()))?;

        parse_entry_slug(params, read_slug(&contents, params.path)?)
    }
}

/// Pick the frontmatter slug over the generated one, rejecting non-strings.
pub fn parse_entry_slug(params: &SlugParams<'_>, frontmatter: FrontmatterSlug) -> Result<String> {
    match frontmatter {
        FrontmatterSlug::Missing => Ok(params.generated_slug.to_owned()),
        FrontmatterSlug::Slug(slug) => Ok(slug),
        FrontmatterSlug::Invalid(found) => Err(ContentError::InvalidContentEntrySlug {
            collection: params.collection.to_owned(),
            id: params.id.to_owned(),
            found: found.to_owned(),
        }
        .into()),
    }
}
