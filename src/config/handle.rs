//! Observable state of the collection config.
//!
//! Uses `arc-swap` for lock-free reads and atomic state replacement. The
//! generator is the only writer (on config-file events); readers are the type
//! synthesizer, the typo check and anything else holding the `Arc`.
//!
//! # States
//!
//! ```text
//!  Unloaded ──► Loading ──┬──► Loaded(config)
//!                  ▲      ├──► DoesNotExist
//!                  │      └──► Error(err)
//!                  └──── next config event
//! ```

use super::collections::ContentConfig;
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Current status of the collection config.
#[derive(Debug, Clone, Default)]
pub enum ConfigState {
    #[default]
    Unloaded,
    Loading,
    Loaded(Arc<ContentConfig>),
    DoesNotExist,
    Error(Arc<anyhow::Error>),
}

impl ConfigState {
    /// The loaded config, if any.
    pub fn loaded(&self) -> Option<&ContentConfig> {
        match self {
            Self::Loaded(config) => Some(config),
            _ => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Unloaded => "unloaded",
            Self::Loading => "loading",
            Self::Loaded(_) => "loaded",
            Self::DoesNotExist => "does-not-exist",
            Self::Error(_) => "error",
        }
    }
}

/// Shared holder of the current [`ConfigState`].
///
/// Cloning the holder is cheap and every clone observes the same state.
#[derive(Debug, Clone)]
pub struct ConfigObserver {
    state: Arc<ArcSwap<ConfigState>>,
}

impl Default for ConfigObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigObserver {
    pub fn new() -> Self {
        Self {
            state: Arc::new(ArcSwap::from_pointee(ConfigState::Unloaded)),
        }
    }

    /// Current state. Wait-free.
    #[inline]
    pub fn get(&self) -> Arc<ConfigState> {
        self.state.load_full()
    }

    /// Replace the state atomically.
    ///
    /// Readers that loaded the previous state keep it alive until they drop it.
    #[inline]
    pub fn set(&self, state: ConfigState) {
        self.state.store(Arc::new(state));
    }
}
