//! Content collection discovery and typing.
//!
//! Keeps an in-memory model of the collections under the content root in
//! sync with filesystem events, and derives two artifacts from it:
//!
//! - `<cache>/types.d.ts`, written after every batch that changed the model
//! - the `virtual:content` module, whose lookup map is rebuilt on each load
//!
//! # Data Flow
//!
//! ```text
//! watcher ──► EventSender ──► queue (debounce) ──► ContentTypesGenerator
//!                                                     │
//!                                 ┌───────────────────┼──────────────────┐
//!                                 ▼                   ▼                  ▼
//!                           CollectionMap       types.d.ts       ModuleGraph
//!                                                                invalidation
//! ```
//!
//! # Modules
//!
//! | Module        | Purpose                                          |
//! |---------------|--------------------------------------------------|
//! | `category`    | Path classification, entry ids, generated slugs  |
//! | `event`       | Event types and per-batch reports                |
//! | `generator`   | Event dispatcher owning the collection map       |
//! | `queue`       | Debounced event queue and its consumer thread    |
//! | `store`       | The collection map                               |
//! | `types`       | Declarations synthesis                           |
//! | `virtual_mod` | Virtual module and lookup map                    |

mod category;
mod entry_types;
mod error;
mod event;
mod frontmatter;
mod generator;
mod paths;
mod queue;
mod slug;
mod store;
mod types;
mod virtual_mod;

pub use event::{BatchReport, EventName, EventOpts, RawContentEvent};
pub use generator::{ContentTypesGenerator, InitOutcome};
pub use paths::root_relative_path;
pub use queue::{EventQueue, EventSender};
pub use slug::FrontmatterSlugResolver;
pub use virtual_mod::{MemoryModuleGraph, VIRTUAL_MODULE_ID, VirtualModule};

use category::Classifier;
use crate::config::Settings;
use entry_types::EntryTypeRegistry;
use paths::ContentPaths;
use std::sync::Arc;

/// Name of the generated declarations file inside the cache directory.
pub const CONTENT_TYPES_FILE: &str = "types.d.ts";

/// Everything derived from [`Settings`] that the generator and the virtual
/// module share.
#[derive(Debug, Clone)]
pub struct ContentContext {
    pub paths: ContentPaths,
    pub classifier: Classifier,
    pub entry_types: Arc<EntryTypeRegistry>,
}

impl ContentContext {
    pub fn from_settings(settings: &Settings) -> Self {
        let paths = ContentPaths::from_settings(settings);
        let entry_types = EntryTypeRegistry::from_settings(&settings.content);
        let classifier = Classifier::new(
            &paths.content_dir,
            &paths.config,
            entry_types.extensions().to_vec(),
            settings.content.data_extensions.clone(),
            settings.content.ignore_images,
        );

        Self {
            paths,
            classifier,
            entry_types: Arc::new(entry_types),
        }
    }
}
