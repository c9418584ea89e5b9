//! Debug-only failure reporting.
//!
//! The pipeline asks `is_debug_enabled()` before doing anything else on a
//! failure branch, so a disabled sink costs one flag check.

/// Receives a warning for every failed call while debug mode is on.
pub trait DebugSink: Send + Sync {
    fn is_debug_enabled(&self) -> bool;

    /// `context` names the entry point and request, e.g. `"get_for_type GET http://.."`.
    fn warn(&self, context: &str, message: &str);
}

/// Emits `tracing` warnings. Debug mode is fixed at construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink {
    enabled: bool,
}

impl TracingSink {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl DebugSink for TracingSink {
    fn is_debug_enabled(&self) -> bool {
        self.enabled
    }

    fn warn(&self, context: &str, message: &str) {
        tracing::warn!(context, "{message}");
    }
}
