use crate::value::Value;
use serde::Serialize;

/// The kind of statement a compiler produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    /// The leading SQL keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        }
    }
}

/// One audited statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    pub kind: StatementKind,
    /// SQL with `?` placeholders, as sent to the executor.
    pub sql: String,
    /// Bound arguments in placeholder order.
    pub args: Vec<Value>,
    /// SQL with placeholders substituted by argument text.
    pub rendered: String,
}

impl AuditEntry {
    pub fn new(kind: StatementKind, sql: impl Into<String>, args: Vec<Value>) -> Self {
        let sql = sql.into();
        let rendered = super::render(&sql, &args);
        Self {
            kind,
            sql,
            args,
            rendered,
        }
    }
}

/// Destination for audited statements.
///
/// Sinks may be shared by many builders across threads, so `record` takes
/// `&self` and implementations must synchronize internally.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &AuditEntry);
}
