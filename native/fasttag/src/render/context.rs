//! Render Context and Indentation
//!
//! Formatting policy lives in an immutable `RenderContext` that is passed
//! into every render, so concurrent renders with different settings never
//! interfere.
//!
//! The process-wide indent (`set_indent`) is still available for call sites
//! that do not carry a context. A render snapshots it once via
//! `RenderContext::global()`, so a single render never mixes two settings.

use std::sync::atomic::{AtomicI64, Ordering};

/// Default process-wide indent width
pub const DEFAULT_INDENT: usize = 2;

/// Default limit on element / sequence nesting
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Legacy integer encoding: negative means disabled
static GLOBAL_INDENT: AtomicI64 = AtomicI64::new(DEFAULT_INDENT as i64);

/// Pretty-printing policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indent {
    /// No whitespace beyond what the content carries
    Disabled,
    /// Each child on its own line, indented by this many spaces per level
    Width(usize),
}

impl Indent {
    /// Decode the legacy integer form (`-1` = disabled)
    pub fn from_legacy(value: i64) -> Self {
        if value < 0 {
            Indent::Disabled
        } else {
            Indent::Width(value as usize)
        }
    }

    /// Encode as the legacy integer form
    pub fn to_legacy(self) -> i64 {
        match self {
            Indent::Disabled => -1,
            Indent::Width(w) => i64::try_from(w).unwrap_or(i64::MAX),
        }
    }

    #[inline]
    pub fn width(self) -> Option<usize> {
        match self {
            Indent::Disabled => None,
            Indent::Width(w) => Some(w),
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Indent::Width(DEFAULT_INDENT)
    }
}

/// Set the process-wide indent used by renders without an explicit context
pub fn set_indent(indent: Indent) {
    let previous = GLOBAL_INDENT.swap(indent.to_legacy(), Ordering::SeqCst);
    tracing::debug!(
        previous = previous,
        current = indent.to_legacy(),
        "process-wide indent changed"
    );
}

/// Current process-wide indent
pub fn indent() -> Indent {
    Indent::from_legacy(GLOBAL_INDENT.load(Ordering::SeqCst))
}

/// Immutable configuration for one render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub indent: Indent,
    pub max_depth: usize,
}

impl Default for RenderContext {
    fn default() -> Self {
        RenderContext {
            indent: Indent::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl RenderContext {
    pub fn new(indent: Indent) -> Self {
        RenderContext {
            indent,
            ..Self::default()
        }
    }

    /// Context without any added whitespace
    pub fn compact() -> Self {
        Self::new(Indent::Disabled)
    }

    /// Snapshot of the process-wide indent
    pub fn global() -> Self {
        Self::new(indent())
    }

    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Scoped override of the process-wide indent, restored on drop
///
/// The override is still process-wide: other threads rendering without an
/// explicit context observe it while the guard is alive.
#[must_use = "the previous indent is restored when the guard is dropped"]
pub struct IndentGuard {
    previous: Indent,
}

impl IndentGuard {
    pub fn new(indent: Indent) -> Self {
        let previous = self::indent();
        set_indent(indent);
        IndentGuard { previous }
    }
}

impl Drop for IndentGuard {
    fn drop(&mut self) {
        set_indent(self.previous);
    }
}

/// Serializes tests that touch the process-wide indent
#[cfg(test)]
pub(crate) static GLOBAL_TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
