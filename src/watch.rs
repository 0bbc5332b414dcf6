//! File system watcher feeding the content event queue.
//!
//! Translates `notify` events into content events and forwards them to an
//! [`EventSender`]; debouncing and batching happen in the queue.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐    ┌─────────────┐    ┌───────────────┐
//! │ notify   │───▶│ translate() │───▶│ EventSender   │───▶ queue thread
//! │ events   │    │ add/unlink… │    │ (content root)│
//! └──────────┘    └─────────────┘    └───────────────┘
//!       ▲
//!  Ctrl+C ends the loop
//! ```

use crate::{
    config::Settings,
    content::{EventName, EventOpts, EventSender, RawContentEvent, root_relative_path},
    log,
    logger::{LogLevel, Severity},
};
use anyhow::{Context, Result};
use notify::{
    Event, EventKind, RecursiveMode, Watcher,
    event::{CreateKind, ModifyKind, RemoveKind},
};
use std::{path::Path, sync::mpsc};

// =============================================================================
// Path Utilities
// =============================================================================

/// Check if path is a temp/backup/hidden file (editor artifacts).
fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Directory or file kind of a path that may no longer exist.
///
/// Gone paths cannot be inspected, so a missing extension means directory.
fn looks_like_dir(path: &Path) -> bool {
    if path.exists() {
        path.is_dir()
    } else {
        path.extension().is_none()
    }
}

// =============================================================================
// Translation
// =============================================================================

/// Map one `notify` event onto content events, one per affected path.
fn translate(event: &Event) -> Vec<RawContentEvent> {
    event
        .paths
        .iter()
        .filter(|path| !is_temp_file(path))
        .filter_map(|path| {
            let name = match event.kind {
                EventKind::Create(CreateKind::Folder) => EventName::AddDir,
                EventKind::Create(CreateKind::File) => EventName::Add,
                EventKind::Create(_) if path.is_dir() => EventName::AddDir,
                EventKind::Create(_) => EventName::Add,

                EventKind::Remove(RemoveKind::Folder) => EventName::UnlinkDir,
                EventKind::Remove(RemoveKind::File) => EventName::Unlink,
                EventKind::Remove(_) if looks_like_dir(path) => EventName::UnlinkDir,
                EventKind::Remove(_) => EventName::Unlink,

                // A rename is an unlink of the old path plus an add of the new one
                EventKind::Modify(ModifyKind::Name(_)) => match (path.exists(), looks_like_dir(path)) {
                    (true, true) => EventName::AddDir,
                    (true, false) => EventName::Add,
                    (false, true) => EventName::UnlinkDir,
                    (false, false) => EventName::Unlink,
                },
                EventKind::Modify(ModifyKind::Metadata(_)) => return None,
                EventKind::Modify(_) if path.is_file() => EventName::Change,

                _ => return None,
            };
            Some(RawContentEvent::new(name, path))
        })
        .collect()
}

// =============================================================================
// Watcher Setup
// =============================================================================

enum WatchMessage {
    Fs(notify::Result<Event>),
    Shutdown,
}

/// Log watched paths.
fn log_watch_summary(settings: &Settings) {
    let root = settings.get_root();
    let content = root_relative_path(root, &settings.build.content, true);
    let cache = root_relative_path(root, &settings.build.cache, true);

    log!("watch"; "content: {content}");
    log!("watch"; "types: {cache}");
}

/// Watch the content root until Ctrl+C, forwarding events to `sender`.
pub fn watch_for_changes_blocking(
    settings: &Settings,
    sender: &EventSender,
    log_level: LogLevel,
) -> Result<()> {
    if !settings.watch.enable {
        return Ok(());
    }

    let (tx, rx) = mpsc::channel();

    let fs_tx = tx.clone();
    let mut watcher = notify::recommended_watcher(move |res| {
        fs_tx.send(WatchMessage::Fs(res)).ok();
    })
    .context("Failed to create file watcher")?;

    watcher
        .watch(&settings.build.content, RecursiveMode::Recursive)
        .with_context(|| {
            format!(
                "Failed to watch content: {}",
                settings.build.content.display()
            )
        })?;

    ctrlc::set_handler(move || {
        tx.send(WatchMessage::Shutdown).ok();
    })
    .context("Failed to set Ctrl+C handler")?;

    if log_level.allows(Severity::Info) {
        log_watch_summary(settings);
    }

    let opts = EventOpts::with_level(log_level);
    for message in rx {
        match message {
            WatchMessage::Fs(Ok(event)) => {
                for raw in translate(&event) {
                    sender.queue_event(raw, Some(opts));
                }
            }
            WatchMessage::Fs(Err(e)) => log!("watch"; "error: {e}"),
            WatchMessage::Shutdown => {
                if log_level.allows(Severity::Info) {
                    log!("watch"; "shutting down...");
                }
                break;
            }
        }
    }

    Ok(())
}
