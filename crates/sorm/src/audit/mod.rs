//! Audit trail of executed statements.
//!
//! When auditing is enabled on a builder, every compiled statement is handed
//! to an [`AuditSink`] before execution. The entry carries the SQL, its bound
//! arguments, and a human-readable rendering with each `?` replaced by the
//! argument text. The rendering is for inspection only, never re-executed.
//!
//! # Example
//!
//! ```rust,ignore
//! use sorm::{AuditLog, StatementBuilder};
//! use std::sync::Arc;
//!
//! let log = AuditLog::new();
//! let mut db = StatementBuilder::new().with_audit_sink(Arc::new(log.clone()));
//!
//! db.table("users").fields("*").eq("id", 5).enable_audit();
//! let rows = db.fetch_all(&conn).await?;
//!
//! assert_eq!(log.entries()[0], "SELECT * FROM `users` WHERE `id` = 5 LIMIT 0,100");
//! ```

mod sinks;
mod tracing_sink;
mod types;


pub use sinks::{AuditLog, CompositeAuditSink, NoopAuditSink};
pub use tracing_sink::TracingAuditSink;
pub use types::{AuditEntry, AuditSink, StatementKind};

/// Replace each `?` in `sql`, left to right, with the display text of the
/// matching argument. Placeholders without an argument are left as `?`.
pub fn render(sql: &str, args: &[crate::Value]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(sql.len() + args.len() * 8);
    let mut args = args.iter();
    for ch in sql.chars() {
        if ch == '?' {
            match args.next() {
                Some(arg) => {
                    let _ = write!(&mut out, "{arg}");
                }
                None => out.push('?'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
