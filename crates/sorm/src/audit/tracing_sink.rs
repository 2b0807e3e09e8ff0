use super::truncate_sql_bytes;
use super::types::{AuditEntry, AuditSink};
use tracing::Level;

/// A `tracing`-based sink that emits every audited statement as an event.
///
/// Events use target `sorm.audit` and carry the statement kind, argument
/// count, and the rendered SQL.
#[derive(Debug, Clone)]
pub struct TracingAuditSink {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for TracingAuditSink {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            max_sql_length: Some(500),
        }
    }
}

impl TracingAuditSink {
    /// Create a new sink with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: &AuditEntry) {
        /// Dispatch a tracing event at a runtime-determined level.
        macro_rules! emit_at_level {
            ($level:expr, $($field:tt)*) => {
                match $level {
                    Level::ERROR => tracing::error!($($field)*),
                    Level::WARN  => tracing::warn!($($field)*),
                    Level::INFO  => tracing::info!($($field)*),
                    Level::DEBUG => tracing::debug!($($field)*),
                    _ => tracing::trace!($($field)*),
                }
            };
        }

        let sql = self.truncate_sql(&entry.rendered);
        emit_at_level!(
            self.level,
            target: "sorm.audit",
            kind = entry.kind.keyword(),
            arg_count = entry.args.len(),
            sql = %sql,
        );
    }
}
