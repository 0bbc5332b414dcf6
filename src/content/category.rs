//! Entry classification for content events.
//!
//! Decides the role a path plays inside the content root, which collection
//! owns it, and which id and default slug it gets.
//!
//! # Entry Types
//!
//! | Type          | Handling                              | Example Files                 |
//! |---------------|---------------------------------------|-------------------------------|
//! | `Config`      | Reload collection config              | `content/config.toml`         |
//! | `Content`     | Tracked in the collection map         | `content/blog/post.md`        |
//! | `Data`        | Reserved for data collections         | `content/authors/jane.json`   |
//! | `Unsupported` | Batched warning                       | `content/blog/notes.txt`      |
//! | `Ignored`     | Nothing                               | `content/_drafts/a.md`        |
//!
//! Config is checked first, then the ignore rules, then the extension lists.

use super::{entry_types::extname, error::ContentError, paths::to_slash, slug::github_slug};
use anyhow::Result;
use std::{
    env,
    path::{Path, PathBuf},
};

/// File names that never take part in content discovery.
const IGNORE_LIST: &[&str] = &[".DS_Store"];

/// Extensions treated as images when `ignore_images` is on.
const IMAGE_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".webp", ".avif", ".gif", ".svg", ".tiff",
];

/// Role of a path inside the content root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Config,
    Content,
    Data,
    Unsupported,
    Ignored,
}

/// Id and path-derived slug of a content entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub id: String,
    pub slug: String,
}

/// Classifies paths according to the content layout and registered extensions.
#[derive(Debug, Clone)]
pub struct Classifier {
    content_dir: PathBuf,
    config: PathBuf,
    content_exts: Vec<String>,
    data_exts: Vec<String>,
    ignore_images: bool,
}

impl Classifier {
    pub fn new(
        content_dir: impl Into<PathBuf>,
        config: impl Into<PathBuf>,
        content_exts: Vec<String>,
        data_exts: Vec<String>,
        ignore_images: bool,
    ) -> Self {
        Self {
            content_dir: content_dir.into(),
            config: config.into(),
            content_exts,
            data_exts,
            ignore_images,
        }
    }

    pub fn data_extensions(&self) -> &[String] {
        &self.data_exts
    }

    /// Classify an absolute file path.
    pub fn classify(&self, path: &Path) -> EntryType {
        let path = normalize_path(path);
        let ext = extname(&path);

        if path == self.config {
            EntryType::Config
        } else if self.is_ignored(&path, &ext) {
            EntryType::Ignored
        } else if self.content_exts.contains(&ext) {
            EntryType::Content
        } else if self.data_exts.contains(&ext) {
            EntryType::Data
        } else {
            EntryType::Unsupported
        }
    }

    fn is_ignored(&self, path: &Path, ext: &str) -> bool {
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

        has_underscore_below(path, &self.content_dir)
            || IGNORE_LIST.contains(&name)
            || is_temp_file(name, ext)
            || (self.ignore_images && IMAGE_EXTENSIONS.contains(&ext))
    }
}

/// Any path segment below `content_dir` starting with `_` opts the file out.
fn has_underscore_below(path: &Path, content_dir: &Path) -> bool {
    path.strip_prefix(content_dir).is_ok_and(|rel| {
        rel.components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('_'))
    })
}

/// Check if a file name is a temp/backup file (editor artifacts).
fn is_temp_file(name: &str, ext: &str) -> bool {
    matches!(ext, ".bck" | ".bak" | ".backup" | ".swp" | ".swo" | ".tmp") || name.ends_with('~')
}

/// Collection owning `path`: the first directory below `content_dir`.
///
/// Files directly in the content root, or outside it, have no collection.
pub fn entry_collection_name(path: &Path, content_dir: &Path) -> Option<String> {
    let rel = path.strip_prefix(content_dir).ok()?;
    let parent = rel.parent()?;
    let first = parent.components().next()?;
    let name = first.as_os_str().to_str()?;

    match name {
        "" | "." | ".." => None,
        name => Some(name.to_owned()),
    }
}

/// `/`-separated path of `path` relative to `base`.
///
/// Segments that are not valid UTF-8 are converted lossily.
pub fn relative_id(path: &Path, base: &Path) -> Result<String> {
    let rel = path
        .strip_prefix(base)
        .map_err(|_| ContentError::OutsideContentDir(path.to_path_buf()))?;
    Ok(to_slash(rel))
}

/// Compute the entry id and the generated slug for a content file.
///
/// The id is the path relative to the collection directory. The slug slugifies
/// every segment of the id without its extension and drops a trailing `/index`.
///
/// | Path (in `blog`)          | id                  | slug             |
/// |---------------------------|---------------------|------------------|
/// | `blog/post-1.md`          | `post-1.md`         | `post-1`         |
/// | `blog/Guides/My Post.md`  | `Guides/My Post.md` | `guides/my-post` |
/// | `blog/guides/index.md`    | `guides/index.md`   | `guides`         |
pub fn content_entry_id_and_slug(
    path: &Path,
    content_dir: &Path,
    collection: &str,
) -> Result<EntryInfo> {
    let id = relative_id(path, &content_dir.join(collection))?;

    let ext = extname(Path::new(&id));
    let without_ext = id.strip_suffix(ext.as_str()).unwrap_or(&id);

    let slug = without_ext
        .split('/')
        .map(github_slug)
        .collect::<Vec<_>>()
        .join("/");
    let slug = slug.strip_suffix("/index").map(str::to_owned).unwrap_or(slug);

    Ok(EntryInfo { id, slug })
}

/// Normalize a path to absolute form for reliable comparison.
///
/// Watcher paths may be relative or point at files that no longer exist
/// (unlink events), so canonicalization is best-effort.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}
