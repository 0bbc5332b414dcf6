//! Filesystem events as seen by the content pipeline.

use super::category::normalize_path;
use crate::logger::LogLevel;
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Kind of filesystem change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    Add,
    AddDir,
    Change,
    Unlink,
    UnlinkDir,
}

impl EventName {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::AddDir => "addDir",
            Self::Change => "change",
            Self::Unlink => "unlink",
            Self::UnlinkDir => "unlinkDir",
        }
    }

    pub const fn is_dir(self) -> bool {
        matches!(self, Self::AddDir | Self::UnlinkDir)
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event as produced by a watcher: the path may be relative or non-canonical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContentEvent {
    pub name: EventName,
    pub path: PathBuf,
}

impl RawContentEvent {
    pub fn new(name: EventName, path: impl Into<PathBuf>) -> Self {
        Self {
            name,
            path: path.into(),
        }
    }

    /// Resolve the path to absolute form.
    pub fn normalize(self) -> ContentEvent {
        ContentEvent {
            name: self.name,
            entry: normalize_path(&self.path),
        }
    }
}

/// Normalized event with an absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEvent {
    pub name: EventName,
    pub entry: PathBuf,
}

impl ContentEvent {
    pub fn is_within(&self, dir: &Path) -> bool {
        self.entry.starts_with(dir)
    }
}

/// Per-event options supplied by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOpts {
    pub log_level: LogLevel,
}

impl EventOpts {
    pub const fn with_level(log_level: LogLevel) -> Self {
        Self { log_level }
    }
}

/// An event waiting in the pending batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedEvent {
    pub event: ContentEvent,
    pub opts: EventOpts,
}

/// Non-fatal observation made while handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventWarning {
    /// Entry id (relative to the content root) of a file nobody can render.
    UnsupportedFileType(String),
    /// Content file sitting directly in the content root.
    NotInCollection(PathBuf),
}

/// Outcome of handling one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventResponse {
    pub should_generate_types: bool,
    pub warning: Option<EventWarning>,
}

impl EventResponse {
    pub const fn none() -> Self {
        Self {
            should_generate_types: false,
            warning: None,
        }
    }

    pub const fn generate() -> Self {
        Self {
            should_generate_types: true,
            warning: None,
        }
    }

    pub const fn warn(warning: EventWarning) -> Self {
        Self {
            should_generate_types: false,
            warning: Some(warning),
        }
    }
}

/// How batch failures are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Propagate the first error. Used for the initial run.
    Strict,
    /// Log the error and drop the rest of the batch. Used while watching.
    Lenient,
}

/// What a batch run did, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Number of events processed (including the failing one, if any).
    pub events: usize,
    pub types_generated: bool,
    /// Ids of unsupported files, in arrival order.
    pub unsupported: Vec<String>,
    /// Content files found outside any collection.
    pub unnested: Vec<PathBuf>,
    /// Collections declared in the config but absent from the map.
    pub nonexistent_collections: Vec<String>,
    /// Error that aborted a lenient run.
    pub error: Option<String>,
}
