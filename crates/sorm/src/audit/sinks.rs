use super::types::{AuditEntry, AuditSink};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

/// A sink that drops every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _entry: &AuditEntry) {}
}

/// Append-only, in-memory list of rendered statements.
///
/// Cloning yields another handle to the same list. The list lives as long as
/// its last handle; [`AuditLog::global`] lives for the whole process.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    entries: Arc<Mutex<Vec<String>>>,
}

static GLOBAL_AUDIT_LOG: OnceLock<AuditLog> = OnceLock::new();

impl AuditLog {
    /// Create a new, empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide log used by builders that were not given a sink.
    pub fn global() -> &'static AuditLog {
        GLOBAL_AUDIT_LOG.get_or_init(AuditLog::new)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        // Poisoned locks still hold a consistent list.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a rendered statement.
    pub fn push(&self, rendered: impl Into<String>) {
        self.lock().push(rendered.into());
    }

    /// Snapshot of all rendered statements, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// The most recent rendered statement.
    pub fn last(&self) -> Option<String> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl AuditSink for AuditLog {
    fn record(&self, entry: &AuditEntry) {
        self.push(entry.rendered.clone());
    }
}

/// A sink that forwards every entry to several sinks in order.
#[derive(Clone, Default)]
pub struct CompositeAuditSink {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl CompositeAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sink.
    pub fn add<S: AuditSink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Add an already shared sink.
    pub fn add_arc(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl AuditSink for CompositeAuditSink {
    fn record(&self, entry: &AuditEntry) {
        for sink in &self.sinks {
            sink.record(entry);
        }
    }
}
