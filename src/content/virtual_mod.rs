//! The `virtual:content` module.
//!
//! Its text is the virtual module template with directory and glob markers
//! filled once at construction, plus a lookup map
//! (`collection → slug → root-relative path`) recomputed by rescanning the
//! content root on every load. Loaded text is cached by a [`ModuleGraph`];
//! invalidating the module drops that cache so the next import reloads it.

use super::{
    ContentContext,
    category::{EntryType, content_entry_id_and_slug, entry_collection_name},
    entry_types::ext_glob,
    paths::root_relative_path,
    slug::{SlugParams, SlugResolver},
};
use crate::warning;
use anyhow::{Context, Result};
use parking_lot::RwLock;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use walkdir::WalkDir;

/// Public id imported by generated code.
pub const VIRTUAL_MODULE_ID: &str = "virtual:content";
/// Internal id the public one resolves to.
pub const RESOLVED_VIRTUAL_MODULE_ID: &str = "\0virtual:content";

const LOOKUP_MAP_MARKER: &str = "/* @@LOOKUP_MAP_ASSIGNMENT@@ */";

/// Built-in virtual module template.
pub const DEFAULT_VIRTUAL_MOD_TEMPLATE: &str = include_str!("../../templates/virtual-mod.mjs");

// ============================================================================
// Module Graph
// ============================================================================

/// The part of a bundler's module graph the content pipeline talks to.
pub trait ModuleGraph: Send + Sync {
    /// Whether a module with this resolved id is currently loaded.
    fn contains_module(&self, id: &str) -> bool;

    /// Mark a loaded module stale so the next import reloads it.
    fn invalidate_module(&self, id: &str);
}

/// Module graph keeping loaded module text in memory.
#[derive(Debug, Default)]
pub struct MemoryModuleGraph {
    modules: RwLock<FxHashMap<String, String>>,
}

impl MemoryModuleGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import `id` through `module`, loading it only when not cached.
    ///
    /// Returns `None` when `module` does not own `id`.
    pub fn import(&self, module: &VirtualModule, id: &str) -> Result<Option<String>> {
        let Some(resolved) = module.resolve_id(id) else {
            return Ok(None);
        };

        // Fast path: read lock only
        if let Some(code) = self.modules.read().get(resolved) {
            return Ok(Some(code.clone()));
        }

        let Some(code) = module.load(resolved)? else {
            return Ok(None);
        };
        self.modules
            .write()
            .insert(resolved.to_owned(), code.clone());
        Ok(Some(code))
    }
}

impl ModuleGraph for MemoryModuleGraph {
    fn contains_module(&self, id: &str) -> bool {
        self.modules.read().contains_key(id)
    }

    fn invalidate_module(&self, id: &str) {
        self.modules.write().remove(id);
    }
}

/// Invalidate the virtual module if it is loaded. Returns whether it was.
pub fn invalidate_virtual_mod(graph: &dyn ModuleGraph) -> bool {
    if !graph.contains_module(RESOLVED_VIRTUAL_MODULE_ID) {
        return false;
    }
    graph.invalidate_module(RESOLVED_VIRTUAL_MODULE_ID);
    true
}

// ============================================================================
// Virtual Module
// ============================================================================

pub struct VirtualModule {
    context: ContentContext,
    resolver: Arc<dyn SlugResolver>,
    /// Template with every marker except the lookup map filled in.
    contents: String,
}

impl VirtualModule {
    pub fn new(context: ContentContext, resolver: Arc<dyn SlugResolver>) -> Result<Self> {
        let template = match &context.paths.virtual_mod_template {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read template {}", path.display()))?,
            None => DEFAULT_VIRTUAL_MOD_TEMPLATE.to_owned(),
        };
        let contents = fill_dirs(&template, &context);

        Ok(Self {
            context,
            resolver,
            contents,
        })
    }

    pub fn resolve_id(&self, id: &str) -> Option<&'static str> {
        (id == VIRTUAL_MODULE_ID || id == RESOLVED_VIRTUAL_MODULE_ID)
            .then_some(RESOLVED_VIRTUAL_MODULE_ID)
    }

    /// Module text for a resolved id, with a freshly scanned lookup map.
    pub fn load(&self, id: &str) -> Result<Option<String>> {
        if id != RESOLVED_VIRTUAL_MODULE_ID {
            return Ok(None);
        }

        let lookup = build_lookup_map(&self.context, self.resolver.as_ref())?;
        for duplicate in &lookup.duplicates {
            warning!("content";
                "duplicate slug `{}` in collection `{}`, using {}",
                duplicate.slug, duplicate.collection, duplicate.path);
        }

        let json = serde_json::to_string(&lookup.map).context("Failed to serialize lookup map")?;
        Ok(Some(self.contents.replacen(
            LOOKUP_MAP_MARKER,
            &format!("lookupMap = {json};"),
            1,
        )))
    }
}

/// Fill the directory and glob markers of the template.
fn fill_dirs(template: &str, context: &ContentContext) -> String {
    let paths = &context.paths;
    let content_dir = root_relative_path(&paths.root, &paths.content_dir, true);
    let data_dir = root_relative_path(&paths.root, &paths.data_dir, true);

    let content_glob = ext_glob(context.entry_types.extensions());
    let data_glob = ext_glob(context.classifier.data_extensions());

    template
        .replacen("@@CONTENT_DIR@@", &content_dir, 1)
        .replacen("@@DATA_DIR@@", &data_dir, 1)
        .replacen(
            "@@CONTENT_ENTRY_GLOB_PATH@@",
            &format!("{content_dir}**/*{content_glob}"),
            1,
        )
        .replacen(
            "@@DATA_ENTRY_GLOB_PATH@@",
            &format!("{data_dir}**/*{data_glob}"),
            1,
        )
        // Data entries have no render step
        .replacen(
            "@@RENDER_ENTRY_GLOB_PATH@@",
            &format!("{content_dir}**/*{content_glob}"),
            1,
        )
}

// ============================================================================
// Lookup Map
// ============================================================================

/// Two entries of one collection claiming the same slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSlug {
    pub collection: String,
    pub slug: String,
    /// Root-relative path that won.
    pub path: String,
}

/// `collection → slug → root-relative path`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupMap {
    pub map: BTreeMap<String, BTreeMap<String, String>>,
    pub duplicates: Vec<DuplicateSlug>,
}

/// Scan the content root and resolve the slug of every content entry.
///
/// Slugs are resolved in parallel; results are folded in path order so the
/// later path wins on duplicates, deterministically.
pub fn build_lookup_map(context: &ContentContext, resolver: &dyn SlugResolver) -> Result<LookupMap> {
    let content_dir = &context.paths.content_dir;
    if !content_dir.exists() {
        return Ok(LookupMap::default());
    }

    let mut files: Vec<(PathBuf, String)> = WalkDir::new(content_dir)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| context.classifier.classify(path) == EntryType::Content)
        .filter_map(|path| {
            let collection = entry_collection_name(&path, content_dir)?;
            Some((path, collection))
        })
        .collect();
    files.sort();

    let resolved = files
        .par_iter()
        .filter_map(|(path, collection)| {
            context.entry_types.for_path(path)?;
            let slug = content_entry_id_and_slug(path, content_dir, collection).and_then(|info| {
                resolver.resolve(&SlugParams {
                    id: &info.id,
                    collection,
                    generated_slug: &info.slug,
                    path,
                })
            });
            Some(slug.map(|slug| (collection, slug, path)))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut lookup = LookupMap::default();
    for (collection, slug, path) in resolved {
        let rel = root_relative_path(&context.paths.root, path, false);
        let entries = lookup.map.entry(collection.clone()).or_default();
        if entries.insert(slug.clone(), rel.clone()).is_some() {
            lookup.duplicates.push(DuplicateSlug {
                collection: collection.clone(),
                slug,
                path: rel,
            });
        }
    }

    Ok(lookup)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
