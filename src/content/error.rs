//! Content pipeline error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("`{0}` is outside the content directory")]
    OutsideContentDir(PathBuf),

    #[error("Could not parse frontmatter in `{path}`: {message}")]
    Frontmatter { path: PathBuf, message: String },

    #[error("`slug` in `{collection}/{id}` must be a string, found {found}")]
    InvalidContentEntrySlug {
        collection: String,
        id: String,
        found: String,
    },
}
