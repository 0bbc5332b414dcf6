//! Logging utilities with colored output.
//!
//! This module provides:
//! - `log!` macro for informational terminal output with colored prefixes
//! - `warning!` macro for warnings (same prefix, highlighted message)
//! - [`LogLevel`] for gating messages per event or per command
//!
//! # Example
//!
//! ```ignore
//! log!("content"; "{} collection added", name);
//! warning!("content"; "{} must be nested in a collection directory", path);
//!
//! if level.allows(Severity::Info) {
//!     log!("content"; "only shown at info level");
//! }
//! ```

use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use crossterm::{
    execute,
    terminal::{Clear, ClearType, size},
};
use serde::{Deserialize, Serialize};
use std::{
    io::{Write, stderr, stdout},
    sync::OnceLock,
};

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

// ============================================================================
// Layout Constants
// ============================================================================

/// Length of brackets around module name: "[]"
const BRACKET_LEN: usize = 2;
/// Space after prefix: "[module] " <- this space
const SPACE_AFTER_PREFIX: usize = 1;

/// Calculate total prefix length for a module name.
///
/// Returns: `module.len() + 3` (for `[`, `]`, and trailing space)
#[inline]
const fn calc_prefix_len(module_len: usize) -> usize {
    module_len + BRACKET_LEN + SPACE_AFTER_PREFIX
}

/// Get terminal width, cached after first call.
/// Falls back to 120 columns if detection fails.
fn get_terminal_width() -> u16 {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120))
}

// ============================================================================
// Severity & Level
// ============================================================================

/// Severity of a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warn,
}

/// Minimum severity a caller wants to see.
///
/// Every user-visible message of the content pipeline is gated by one of
/// these; events queued without an explicit level use [`LogLevel::Info`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Informational messages and warnings.
    #[default]
    Info,
    /// Warnings only.
    Warn,
    /// Nothing.
    Silent,
}

impl LogLevel {
    /// Whether a message of `severity` passes this level.
    pub const fn allows(self, severity: Severity) -> bool {
        match self {
            Self::Info => true,
            Self::Warn => matches!(severity, Severity::Warn),
            Self::Silent => false,
        }
    }
}

// ============================================================================
// Log Macros
// ============================================================================

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Log a warning with a colored module prefix.
///
/// # Usage
/// ```ignore
/// warning!("module"; "something looks off: {}", detail);
/// ```
#[macro_export]
macro_rules! warning {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::warn($module, &format!($($arg)*))
    }};
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Log a message with a colored module prefix.
///
/// Automatically truncates long single-line messages to fit terminal width.
/// Multiline messages are printed as-is.
#[inline]
pub fn log(module: &str, message: &str) {
    let module_lower = module.to_ascii_lowercase();
    let prefix = colorize_prefix(module, &module_lower);
    let width = get_terminal_width() as usize;

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();

    if message.contains('\n') {
        writeln!(stdout, "{prefix} {message}").ok();
    } else {
        let max_msg_len = width.saturating_sub(calc_prefix_len(module.len()));
        writeln!(stdout, "{prefix} {}", truncate_str(message, max_msg_len)).ok();
    }

    stdout.flush().ok();
}

/// Log a warning to stderr. Warnings are never truncated.
#[inline]
pub fn warn(module: &str, message: &str) {
    let prefix = colorize_prefix(module, "warn");

    let mut stderr = stderr().lock();
    writeln!(stderr, "{prefix} {}", message.yellow()).ok();
    stderr.flush().ok();
}

/// Apply color to a module prefix based on module type.
#[inline]
fn colorize_prefix(module: &str, module_lower: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module_lower {
        "content" => prefix.bright_cyan().bold(),
        "watch" => prefix.bright_green().bold(),
        "warn" => prefix.bright_yellow().bold(),
        "error" => prefix.bright_red().bold(),
        _ => prefix.bright_blue().bold(),
    }
}

/// Truncate a string to fit within `max_len` bytes.
///
/// Ensures the result is valid UTF-8 by finding the nearest character boundary.
#[inline]
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ============================================================================
// Tests
// ============================================================================
