//! Content types generator.
//!
//! Owns the collection map and turns batches of filesystem events into
//! mutations of it. After a batch that changed anything it rewrites the
//! declarations file and invalidates the virtual module.
//!
//! # Event Handling
//!
//! | Event                 | Classified as | Effect                               |
//! |-----------------------|---------------|--------------------------------------|
//! | `addDir`/`unlinkDir`  | (directory)   | Reset / drop a first-level collection|
//! | any                   | `ignored`     | Nothing                              |
//! | any                   | `config`      | Reload the collection config         |
//! | `add`/`change`        | `unsupported` | Batched warning                      |
//! | any                   | `data`        | Nothing yet                          |
//! | `add`                 | `content`     | Insert entry unless already present  |
//! | `change`              | `content`     | Update entry if its slug changed     |
//! | `unlink`              | `content`     | Remove entry                         |

use super::{
    ContentContext,
    category::{EntryType, content_entry_id_and_slug, entry_collection_name},
    event::{
        BatchReport, ContentEvent, EventName, EventOpts, EventResponse, EventWarning, QueuedEvent,
        RunMode,
    },
    paths::to_slash,
    slug::{FrontmatterSlugResolver, SlugParams, SlugResolver},
    store::{CollectionMap, EntryMetadata},
    types::{DEFAULT_TYPES_TEMPLATE, quote, render_content_types, write_content_types},
    virtual_mod::{ModuleGraph, invalidate_virtual_mod},
};
use crate::{
    config::{ConfigLoader, ConfigObserver, ConfigState, TomlConfigLoader},
    log,
    logger::{LogLevel, Severity},
    warning,
};
use anyhow::{Context, Result};
use std::{fs, path::Path, sync::Arc};
use walkdir::WalkDir;

/// Result of the initial run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    TypesGenerated(BatchReport),
    /// The content root does not exist; nothing was generated.
    NoContentDir,
}

pub struct ContentTypesGenerator {
    context: ContentContext,
    observer: ConfigObserver,
    loader: Arc<dyn ConfigLoader>,
    resolver: Arc<dyn SlugResolver>,
    graph: Arc<dyn ModuleGraph>,
    template: String,
    map: CollectionMap,
}

impl ContentTypesGenerator {
    /// Create a generator with an empty collection map.
    ///
    /// Reads the declarations template up front so a broken override fails
    /// before any event is handled.
    pub fn new(
        context: ContentContext,
        observer: ConfigObserver,
        graph: Arc<dyn ModuleGraph>,
    ) -> Result<Self> {
        let template = match &context.paths.types_template {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read template {}", path.display()))?,
            None => DEFAULT_TYPES_TEMPLATE.to_owned(),
        };
        let loader = Arc::new(TomlConfigLoader::new(&context.paths.config));

        Ok(Self {
            context,
            observer,
            loader,
            resolver: Arc::new(FrontmatterSlugResolver),
            graph,
            template,
            map: CollectionMap::new(),
        })
    }

    #[cfg(test)]
    pub fn with_loader(mut self, loader: Arc<dyn ConfigLoader>) -> Self {
        self.loader = loader;
        self
    }

    #[cfg(test)]
    pub fn with_slug_resolver(mut self, resolver: Arc<dyn SlugResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn context(&self) -> &ContentContext {
        &self.context
    }

    pub fn collections(&self) -> &CollectionMap {
        &self.map
    }

    // ------------------------------------------------------------------------
    // Initial run
    // ------------------------------------------------------------------------

    /// Seed the collection map from the content root and generate types.
    ///
    /// The config file is queued first; the walk skips it so it loads once.
    /// Errors propagate.
    pub fn init(&mut self) -> Result<InitOutcome> {
        let paths = &self.context.paths;
        if !paths.content_dir.exists() {
            return Ok(InitOutcome::NoContentDir);
        }

        let opts = EventOpts::with_level(LogLevel::Warn);
        let mut batch = vec![QueuedEvent {
            event: ContentEvent {
                name: EventName::Add,
                entry: paths.config.clone(),
            },
            opts,
        }];

        let files = WalkDir::new(&paths.content_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()))
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| !path.starts_with(&paths.config));

        batch.extend(files.map(|entry| QueuedEvent {
            event: ContentEvent {
                name: EventName::Add,
                entry,
            },
            opts,
        }));

        let report = self.run_events(batch, EventOpts::default(), RunMode::Strict)?;
        Ok(InitOutcome::TypesGenerated(report))
    }

    // ------------------------------------------------------------------------
    // Batches
    // ------------------------------------------------------------------------

    /// Process a batch in arrival order, then regenerate once if needed.
    ///
    /// `opts` gates the batch-level warnings. In [`RunMode::Lenient`] an error
    /// stops the batch, is logged and lands in the report; in
    /// [`RunMode::Strict`] it is returned.
    pub fn run_events(
        &mut self,
        batch: Vec<QueuedEvent>,
        opts: EventOpts,
        mode: RunMode,
    ) -> Result<BatchReport> {
        match self.process_batch(batch, opts) {
            Ok(report) => Ok(report),
            Err((err, _)) if mode == RunMode::Strict => Err(err),
            Err((err, mut report)) => {
                log!("error"; "content update failed: {err:#}");
                report.error = Some(format!("{err:#}"));
                Ok(report)
            }
        }
    }

    fn process_batch(
        &mut self,
        batch: Vec<QueuedEvent>,
        opts: EventOpts,
    ) -> Result<BatchReport, (anyhow::Error, BatchReport)> {
        let mut report = BatchReport::default();
        let mut should_generate = false;

        for queued in batch {
            report.events += 1;
            let response = match self.handle_event(&queued.event, queued.opts) {
                Ok(response) => response,
                Err(err) => return Err((err, report)),
            };

            should_generate |= response.should_generate_types;
            match response.warning {
                Some(EventWarning::UnsupportedFileType(id)) => report.unsupported.push(id),
                Some(EventWarning::NotInCollection(path)) => report.unnested.push(path),
                None => {}
            }
        }

        let level = opts.log_level;
        if !report.unsupported.is_empty() && level.allows(Severity::Warn) {
            let list = report
                .unsupported
                .iter()
                .map(|id| format!("- {id}"))
                .collect::<Vec<_>>()
                .join("\n");
            warning!("content";
                "Unsupported file types found. Prefix with an underscore (`_`) to ignore:\n{list}");
        }

        if should_generate {
            if let Err(err) = self.generate_types() {
                return Err((err, report));
            }
            report.types_generated = true;

            report.nonexistent_collections = self.nonexistent_collections();
            if level.allows(Severity::Warn) {
                for name in &report.nonexistent_collections {
                    warning!("content";
                        "{} is not a collection. Check your content config for typos.",
                        quote(name));
                }
            }
        }

        Ok(report)
    }

    /// Write the declarations file, then invalidate the virtual module.
    fn generate_types(&self) -> Result<()> {
        let state = self.observer.get();
        let text = render_content_types(
            &self.template,
            &self.context.paths,
            &self.context.entry_types,
            &self.map,
            state.loaded(),
        );
        write_content_types(&self.context.paths, &text)?;
        invalidate_virtual_mod(self.graph.as_ref());
        Ok(())
    }

    /// Collections declared in a loaded config but missing from the map.
    fn nonexistent_collections(&self) -> Vec<String> {
        let state = self.observer.get();
        let Some(config) = state.loaded() else {
            return Vec::new();
        };

        config
            .collections
            .keys()
            .filter(|name| !self.map.contains_collection(name))
            .cloned()
            .collect()
    }

    // ------------------------------------------------------------------------
    // Single events
    // ------------------------------------------------------------------------

    /// Apply one event to the collection map.
    pub fn handle_event(&mut self, event: &ContentEvent, opts: EventOpts) -> Result<EventResponse> {
        if event.name.is_dir() {
            return Ok(self.handle_dir_event(event, opts));
        }

        match self.context.classifier.classify(&event.entry) {
            EntryType::Ignored | EntryType::Data => Ok(EventResponse::none()),
            EntryType::Config => {
                self.reload_config();
                Ok(EventResponse::generate())
            }
            EntryType::Unsupported => {
                if event.name == EventName::Unlink {
                    return Ok(EventResponse::none());
                }
                let content_dir = &self.context.paths.content_dir;
                let id = to_slash(event.entry.strip_prefix(content_dir).unwrap_or(&event.entry));
                Ok(EventResponse::warn(EventWarning::UnsupportedFileType(id)))
            }
            EntryType::Content => self.handle_content_event(event, opts),
        }
    }

    fn handle_dir_event(&mut self, event: &ContentEvent, opts: EventOpts) -> EventResponse {
        let Ok(rel) = event.entry.strip_prefix(&self.context.paths.content_dir) else {
            return EventResponse::none();
        };

        // Only first-level directories are collections
        let mut components = rel.components();
        let (Some(first), None) = (components.next(), components.next()) else {
            return EventResponse::none();
        };
        let name = first.as_os_str().to_string_lossy();

        if event.name == EventName::AddDir {
            self.map.add_collection(&name);
            if opts.log_level.allows(Severity::Info) {
                log!("content"; "{name} collection added");
            }
        } else {
            self.map.remove_collection(&name);
        }
        EventResponse::generate()
    }

    /// Loader failures are recorded in the observer, never returned.
    fn reload_config(&self) {
        self.observer.set(ConfigState::Loading);
        let state = match self.loader.load() {
            Ok(Some(config)) => ConfigState::Loaded(Arc::new(config)),
            Ok(None) => ConfigState::DoesNotExist,
            Err(err) => ConfigState::Error(Arc::new(err)),
        };
        self.observer.set(state);
    }

    fn handle_content_event(
        &mut self,
        event: &ContentEvent,
        opts: EventOpts,
    ) -> Result<EventResponse> {
        let content_dir = &self.context.paths.content_dir;

        let Some(collection) = entry_collection_name(&event.entry, content_dir) else {
            let rel = to_slash(event.entry.strip_prefix(content_dir).unwrap_or(&event.entry));
            if opts.log_level.allows(Severity::Warn) {
                warning!("content"; "{rel} must be nested in a collection directory. Skipping.");
            }
            return Ok(EventResponse::warn(EventWarning::NotInCollection(
                event.entry.clone(),
            )));
        };

        if self.context.entry_types.for_path(&event.entry).is_none() {
            return Ok(EventResponse::none());
        }
        let info = content_entry_id_and_slug(&event.entry, content_dir, &collection)?;

        let resolve_slug = || {
            self.resolver.resolve(&SlugParams {
                id: &info.id,
                collection: &collection,
                generated_slug: &info.slug,
                path: &event.entry,
            })
        };

        match event.name {
            EventName::Add => {
                let slug = resolve_slug()?;
                if !self.map.contains_collection(&collection) {
                    self.map.add_collection(&collection);
                }
                if !self.map.contains_entry(&collection, &info.id) {
                    self.map
                        .set_entry(&collection, &info.id, EntryMetadata::new(slug));
                }
                Ok(EventResponse::generate())
            }
            EventName::Unlink => {
                self.map.remove_entry(&collection, &info.id);
                Ok(EventResponse::generate())
            }
            EventName::Change => {
                let slug = resolve_slug()?;
                let unchanged = self
                    .map
                    .get_entry(&collection, &info.id)
                    .is_some_and(|entry| entry.slug == slug);
                if unchanged {
                    return Ok(EventResponse::none());
                }
                if !self.map.contains_collection(&collection) {
                    self.map.add_collection(&collection);
                }
                self.map
                    .set_entry(&collection, &info.id, EntryMetadata::new(slug));
                Ok(EventResponse::generate())
            }
            EventName::AddDir | EventName::UnlinkDir => Ok(EventResponse::none()),
        }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{ContentConfig, Settings},
        content::virtual_mod::RESOLVED_VIRTUAL_MODULE_ID,
    };
    use anyhow::bail;
    use std::{
        path::PathBuf,
        sync::{
            Mutex,
            atomic::{AtomicBool, AtomicUsize, Ordering},
        },
    };
    use tempfile::TempDir;

    /// Graph that always reports the virtual module as loaded.
    #[derive(Default)]
    struct RecordingGraph {
        unloaded: AtomicBool,
        invalidations: AtomicUsize,
    }

    impl ModuleGraph for RecordingGraph {
        fn contains_module(&self, id: &str) -> bool {
            id == RESOLVED_VIRTUAL_MODULE_ID && !self.unloaded.load(Ordering::SeqCst)
        }

        fn invalidate_module(&self, _id: &str) {
            self.invalidations.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FailingLoader;

    impl ConfigLoader for FailingLoader {
        fn load(&self) -> Result<Option<ContentConfig>> {
            bail!("config exploded")
        }
    }

    struct FixedLoader(ContentConfig);

    impl ConfigLoader for FixedLoader {
        fn load(&self) -> Result<Option<ContentConfig>> {
            Ok(Some(self.0.clone()))
        }
    }

    /// Returns queued slugs in order, then the generated slug.
    struct ScriptedResolver {
        slugs: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl ScriptedResolver {
        fn new(slugs: &[&str]) -> Self {
            Self {
                slugs: Mutex::new(slugs.iter().rev().map(|s| s.to_string()).collect()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SlugResolver for ScriptedResolver {
        fn resolve(&self, params: &SlugParams<'_>) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .slugs
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| params.generated_slug.to_owned()))
        }
    }

    struct Fixture {
        _dir: TempDir,
        content: PathBuf,
        graph: Arc<RecordingGraph>,
        observer: ConfigObserver,
        generator: ContentTypesGenerator,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let root = dir.path().canonicalize().unwrap();
            let content = root.join("src/content");
            fs::create_dir_all(&content).unwrap();

            let mut settings = Settings::default();
            settings.set_root(&root);
            settings.build.content = content.clone();
            settings.build.cache = root.join(".contentmap");

            let graph = Arc::new(RecordingGraph::default());
            let observer = ConfigObserver::new();
            let generator = ContentTypesGenerator::new(
                ContentContext::from_settings(&settings),
                observer.clone(),
                graph.clone(),
            )
            .unwrap();

            Self {
                _dir: dir,
                content,
                graph,
                observer,
                generator,
            }
        }

        fn write(&self, rel: &str, text: &str) -> PathBuf {
            let path = self.content.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, text).unwrap();
            path
        }

        fn event(&self, name: EventName, rel: &str) -> QueuedEvent {
            QueuedEvent {
                event: ContentEvent {
                    name,
                    entry: self.content.join(rel),
                },
                opts: EventOpts::with_level(LogLevel::Silent),
            }
        }

        fn run(&mut self, events: Vec<QueuedEvent>) -> BatchReport {
            self.generator
                .run_events(events, EventOpts::with_level(LogLevel::Silent), RunMode::Strict)
                .unwrap()
        }

        fn slug(&self, collection: &str, id: &str) -> Option<String> {
            self.generator
                .collections()
                .get_entry(collection, id)
                .map(|e| e.slug.clone())
        }

        fn types_file(&self) -> PathBuf {
            self.generator.context().paths.types_file()
        }

        fn invalidations(&self) -> usize {
            self.graph.invalidations.load(Ordering::SeqCst)
        }
    }

    #[test]
    fn test_add_dir_then_add_entry() {
        let mut fx = Fixture::new();
        fx.write("blog/post-1.md", "# Post");

        let report = fx.run(vec![
            fx.event(EventName::AddDir, "blog"),
            fx.event(EventName::Add, "blog/post-1.md"),
        ]);

        assert!(report.types_generated);
        assert_eq!(report.events, 2);
        assert_eq!(fx.slug("blog", "post-1.md").as_deref(), Some("post-1"));
        assert_eq!(fx.generator.collections().entries("blog").unwrap().len(), 1);

        let types = fs::read_to_string(fx.types_file()).unwrap();
        assert!(types.contains("\"blog\": {\n\"post-1.md\": {"));
        assert!(types.contains("slug: \"post-1\""));
        assert_eq!(fx.invalidations(), 1);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut fx = Fixture::new();
        fx.write("blog/a.md", "");
        let resolver = Arc::new(ScriptedResolver::new(&["first", "second"]));
        fx.generator = fx.generator.with_slug_resolver(resolver.clone());

        fx.run(vec![fx.event(EventName::Add, "blog/a.md")]);
        fx.run(vec![fx.event(EventName::Add, "blog/a.md")]);

        assert_eq!(fx.slug("blog", "a.md").as_deref(), Some("first"));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_add_creates_missing_collection() {
        let mut fx = Fixture::new();
        fx.write("docs/guides/intro.md", "");

        fx.run(vec![fx.event(EventName::Add, "docs/guides/intro.md")]);
        assert_eq!(fx.slug("docs", "guides/intro.md").as_deref(), Some("guides/intro"));
    }

    #[test]
    fn test_change_only_regenerates_on_slug_change() {
        let mut fx = Fixture::new();
        fx.write("blog/a.md", "");
        fx.generator = fx
            .generator
            .with_slug_resolver(Arc::new(ScriptedResolver::new(&["one", "one", "two"])));

        fx.run(vec![fx.event(EventName::Add, "blog/a.md")]);
        assert_eq!(fx.invalidations(), 1);

        let report = fx.run(vec![fx.event(EventName::Change, "blog/a.md")]);
        assert!(!report.types_generated);
        assert_eq!(fx.invalidations(), 1);

        let report = fx.run(vec![fx.event(EventName::Change, "blog/a.md")]);
        assert!(report.types_generated);
        assert_eq!(fx.slug("blog", "a.md").as_deref(), Some("two"));
        assert_eq!(fx.invalidations(), 2);
    }

    #[test]
    fn test_change_reads_frontmatter_slug() {
        let mut fx = Fixture::new();
        let path = fx.write("blog/a.md", "# A");
        fx.run(vec![fx.event(EventName::Add, "blog/a.md")]);
        assert_eq!(fx.slug("blog", "a.md").as_deref(), Some("a"));

        fs::write(&path, "---\nslug: renamed\n---\n").unwrap();
        let report = fx.run(vec![fx.event(EventName::Change, "blog/a.md")]);
        assert!(report.types_generated);
        assert_eq!(fx.slug("blog", "a.md").as_deref(), Some("renamed"));
    }

    #[test]
    fn test_unlink_leaves_empty_collection() {
        let mut fx = Fixture::new();
        let path = fx.write("blog/post-1.md", "");
        fx.run(vec![fx.event(EventName::Add, "blog/post-1.md")]);

        fs::remove_file(path).unwrap();
        let report = fx.run(vec![fx.event(EventName::Unlink, "blog/post-1.md")]);

        assert!(report.types_generated);
        assert!(fx.generator.collections().contains_collection("blog"));
        assert!(fx.generator.collections().entries("blog").unwrap().is_empty());
    }

    #[test]
    fn test_unlink_unknown_entry_still_regenerates() {
        let mut fx = Fixture::new();
        let report = fx.run(vec![fx.event(EventName::Unlink, "blog/never-existed.md")]);
        assert!(report.types_generated);
        assert!(fx.generator.collections().is_empty());
    }

    #[test]
    fn test_unlink_dir_then_add_dir_has_no_stale_entries() {
        let mut fx = Fixture::new();
        fx.write("blog/a.md", "");
        fx.run(vec![
            fx.event(EventName::AddDir, "blog"),
            fx.event(EventName::Add, "blog/a.md"),
        ]);

        fx.run(vec![
            fx.event(EventName::UnlinkDir, "blog"),
            fx.event(EventName::AddDir, "blog"),
        ]);
        assert!(fx.generator.collections().entries("blog").unwrap().is_empty());
    }

    #[test]
    fn test_add_dir_resets_existing_collection() {
        let mut fx = Fixture::new();
        fx.write("blog/a.md", "");
        fx.run(vec![fx.event(EventName::Add, "blog/a.md")]);

        fx.run(vec![fx.event(EventName::AddDir, "blog")]);
        assert!(fx.generator.collections().entries("blog").unwrap().is_empty());
    }

    #[test]
    fn test_nested_dir_events_ignored() {
        let mut fx = Fixture::new();
        let report = fx.run(vec![
            fx.event(EventName::AddDir, "blog/nested"),
            fx.event(EventName::UnlinkDir, "blog/nested"),
        ]);

        assert!(!report.types_generated);
        assert!(fx.generator.collections().is_empty());
        assert!(!fx.types_file().exists());
    }

    #[test]
    fn test_ignored_only_batch_writes_nothing() {
        let mut fx = Fixture::new();
        fx.write("_drafts/a.md", "");
        fx.write("blog/.DS_Store", "");
        fx.write("authors/jane.json", "{}");

        let report = fx.run(vec![
            fx.event(EventName::Add, "_drafts/a.md"),
            fx.event(EventName::Add, "blog/.DS_Store"),
            fx.event(EventName::Add, "authors/jane.json"),
            fx.event(EventName::Unlink, "blog/notes.txt"),
        ]);

        assert!(!report.types_generated);
        assert!(report.unsupported.is_empty());
        assert!(!fx.types_file().exists());
        assert_eq!(fx.invalidations(), 0);
    }

    #[test]
    fn test_unsupported_files_batched() {
        let mut fx = Fixture::new();
        fx.write("blog/notes.txt", "");
        fx.write("blog/raw.csv", "");

        let report = fx.run(vec![
            fx.event(EventName::Add, "blog/notes.txt"),
            fx.event(EventName::Change, "blog/raw.csv"),
        ]);

        assert_eq!(report.unsupported, vec!["blog/notes.txt", "blog/raw.csv"]);
        assert!(!report.types_generated);
    }

    #[test]
    fn test_file_outside_collection() {
        let mut fx = Fixture::new();
        fx.write("stray.md", "");

        let report = fx.run(vec![fx.event(EventName::Add, "stray.md")]);
        assert_eq!(report.unnested, vec![fx.content.join("stray.md")]);
        assert!(!report.types_generated);
        assert!(fx.generator.collections().is_empty());
    }

    #[test]
    fn test_types_sorted_regardless_of_arrival() {
        let mut fx = Fixture::new();
        for rel in ["zeta/b.md", "zeta/a.md", "alpha/c.md"] {
            fx.write(rel, "");
        }
        fx.run(vec![
            fx.event(EventName::Add, "zeta/b.md"),
            fx.event(EventName::Add, "zeta/a.md"),
            fx.event(EventName::Add, "alpha/c.md"),
        ]);

        let types = fs::read_to_string(fx.types_file()).unwrap();
        let pos = |needle: &str| types.find(needle).unwrap();
        assert!(pos("\"alpha\": {") < pos("\"zeta\": {"));
        assert!(pos("\"a.md\": {") < pos("\"b.md\": {"));
    }

    #[test]
    fn test_config_load_error_recorded() {
        let mut fx = Fixture::new();
        fx.generator = fx.generator.with_loader(Arc::new(FailingLoader));

        let report = fx.run(vec![fx.event(EventName::Add, "config.toml")]);

        assert!(report.types_generated);
        assert!(matches!(*fx.observer.get(), ConfigState::Error(_)));
        assert!(report.nonexistent_collections.is_empty());

        // Later batches skip the typo check while the config is not loaded
        fx.write("blog/a.md", "");
        let report = fx.run(vec![fx.event(EventName::Add, "blog/a.md")]);
        assert!(report.nonexistent_collections.is_empty());
    }

    #[test]
    fn test_config_missing_and_loaded() {
        let mut fx = Fixture::new();

        fx.run(vec![fx.event(EventName::Add, "config.toml")]);
        assert!(matches!(*fx.observer.get(), ConfigState::DoesNotExist));
        let types = fs::read_to_string(fx.types_file()).unwrap();
        assert!(types.contains("type ContentConfig = never;"));

        fx.write(
            "config.toml",
            "[collections.blog]\nschema = { title = \"string\" }\n[collections.blgo]\n",
        );
        fx.write("blog/a.md", "");
        let report = fx.run(vec![
            fx.event(EventName::Change, "config.toml"),
            fx.event(EventName::Add, "blog/a.md"),
        ]);

        assert!(fx.observer.get().loaded().is_some());
        assert_eq!(report.nonexistent_collections, vec!["blgo"]);
        let types = fs::read_to_string(fx.types_file()).unwrap();
        assert!(types.contains("typeof import(\"../src/content/config\")"));
        assert!(types.contains("data: InferEntrySchema<\"blog\">"));
    }

    #[test]
    fn test_custom_loader() {
        let mut fx = Fixture::new();
        let config = ContentConfig::from_str("[collections.docs]\n", Path::new("x")).unwrap();
        fx.generator = fx.generator.with_loader(Arc::new(FixedLoader(config)));

        let report = fx.run(vec![fx.event(EventName::Add, "config.toml")]);
        assert_eq!(report.nonexistent_collections, vec!["docs"]);
    }

    #[test]
    fn test_strict_mode_propagates_slug_error() {
        let mut fx = Fixture::new();
        fx.write("blog/a.md", "---\nslug: 42\n---\n");

        let err = fx
            .generator
            .run_events(
                vec![fx.event(EventName::Add, "blog/a.md")],
                EventOpts::default(),
                RunMode::Strict,
            )
            .unwrap_err();
        assert!(err.to_string().contains("blog/a.md"));
        assert!(!fx.types_file().exists());
    }

    #[test]
    fn test_lenient_mode_aborts_batch() {
        let mut fx = Fixture::new();
        fx.write("blog/a.md", "---\nslug: 42\n---\n");
        fx.write("blog/b.md", "");

        let report = fx
            .generator
            .run_events(
                vec![
                    fx.event(EventName::Add, "blog/a.md"),
                    fx.event(EventName::Add, "blog/b.md"),
                ],
                EventOpts::with_level(LogLevel::Silent),
                RunMode::Lenient,
            )
            .unwrap();

        assert!(report.error.is_some());
        assert_eq!(report.events, 1);
        assert!(!report.types_generated);
        assert!(!fx.generator.collections().contains_entry("blog", "b.md"));
    }

    #[test]
    fn test_unloaded_module_not_invalidated() {
        let mut fx = Fixture::new();
        fx.graph.unloaded.store(true, Ordering::SeqCst);
        fx.write("blog/a.md", "");

        let report = fx.run(vec![fx.event(EventName::Add, "blog/a.md")]);
        assert!(report.types_generated);
        assert_eq!(fx.invalidations(), 0);
    }

    #[test]
    fn test_init_seeds_map() {
        let mut fx = Fixture::new();
        fx.write("config.toml", "[collections.blog]\n");
        fx.write("blog/post-1.md", "");
        fx.write("blog/guides/index.md", "");
        fx.write("blog/notes.txt", "");
        fx.write("_drafts/x.md", "");
        fx.write(".hidden/y.md", "");

        let InitOutcome::TypesGenerated(report) = fx.generator.init().unwrap() else {
            panic!("content dir exists");
        };

        // config + 4 visible files
        assert_eq!(report.events, 5);
        assert_eq!(report.unsupported, vec!["blog/notes.txt"]);
        assert!(report.nonexistent_collections.is_empty());
        assert_eq!(fx.slug("blog", "post-1.md").as_deref(), Some("post-1"));
        assert_eq!(fx.slug("blog", "guides/index.md").as_deref(), Some("guides"));
        assert!(!fx.generator.collections().contains_collection(".hidden"));
        assert!(fx.types_file().exists());
    }

    #[test]
    fn test_init_without_content_dir() {
        let mut fx = Fixture::new();
        fs::remove_dir_all(&fx.content).unwrap();

        assert_eq!(fx.generator.init().unwrap(), InitOutcome::NoContentDir);
        assert!(!fx.types_file().exists());
    }

    #[test]
    fn test_init_propagates_errors() {
        let mut fx = Fixture::new();
        fx.write("blog/a.md", "---\nslug: [1]\n---\n");
        assert!(fx.generator.init().is_err());
    }

    #[test]
    fn test_same_entry_later_event_wins() {
        let mut fx = Fixture::new();
        fx.write("blog/a.md", "");

        fx.run(vec![
            fx.event(EventName::AddDir, "blog"),
            fx.event(EventName::Add, "blog/a.md"),
            fx.event(EventName::Unlink, "blog/a.md"),
        ]);
        assert!(!fx.generator.collections().contains_entry("blog", "a.md"));

        fx.run(vec![
            fx.event(EventName::Unlink, "blog/a.md"),
            fx.event(EventName::Add, "blog/a.md"),
        ]);
        assert!(fx.generator.collections().contains_entry("blog", "a.md"));

        fx.run(vec![
            fx.event(EventName::Add, "blog/a.md"),
            fx.event(EventName::Unlink, "blog/a.md"),
            fx.event(EventName::Add, "blog/a.md"),
        ]);
        assert!(fx.generator.collections().contains_entry("blog", "a.md"));
    }

    #[cfg(unix)]
    #[test]
    fn test_init_tolerates_non_utf8_file_names() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let mut fx = Fixture::new();
        fx.write("blog/ok.md", "");
        let blog = fx.content.join("blog");
        for name in [&b"caf\xe9.txt"[..], &b"caf\xe9.md"[..]] {
            if fs::write(blog.join(OsStr::from_bytes(name)), "").is_err() {
                // Some filesystems reject non-UTF-8 names
                return;
            }
        }

        let InitOutcome::TypesGenerated(report) = fx.generator.init().unwrap() else {
            panic!("content dir exists");
        };
        assert_eq!(report.unsupported, vec!["blog/caf\u{FFFD}.txt"]);
        assert!(fx.generator.collections().contains_entry("blog", "ok.md"));
        assert_eq!(fx.slug("blog", "caf\u{FFFD}.md").as_deref(), Some("caf"));
    }
}
