//! # sorm
//!
//! A fluent, reusable SQL statement builder for MySQL-flavored backends.
//!
//! ## Features
//!
//! - **Fluent builder**: table, fields, predicates, joins, grouping, ordering
//!   and paging through chained `&mut self` calls
//! - **Parameterized output**: every compiled statement is `?`-placeholder SQL
//!   plus an argument list aligned with its placeholders
//! - **Backtick quoting**: dot-aware identifier quoting (`t.col` → `` `t`.`col` ``)
//! - **Reusable**: every terminal operation resets the builder, on success
//!   and on failure
//! - **Pluggable execution**: statements run through any [`Executor`]
//! - **Audit log**: rendered statements can be recorded to an [`AuditSink`]
//!
//! ## Example
//!
//! ```ignore
//! use sorm::{Payload, StatementBuilder, raw};
//!
//! let mut db = StatementBuilder::new();
//!
//! // SELECT `id`,`name` FROM `users` WHERE `status` = ? ORDER BY `id` DESC LIMIT 10 OFFSET 0
//! let users = db
//!     .table("users")
//!     .fields("id,name")
//!     .eq("status", "active")
//!     .desc("id")
//!     .limit(10)
//!     .fetch_all(&conn)
//!     .await?;
//!
//! // INSERT INTO `users` (`name`,`created_at`) VALUE (?,NOW())
//! let id = db
//!     .table("users")
//!     .insert(&conn, Payload::new().set("name", "alice").set("created_at", raw("NOW()")))
//!     .await?;
//!
//! // UPDATE `users` SET `visits` = `visits`+1 WHERE `id` = ?
//! db.table("users").eq("id", id).increase(&conn, [("visits", 1)]).await?;
//! ```

pub mod audit;
pub mod builder;
pub mod condition;
pub mod config;
pub mod error;
pub mod executor;
pub mod ident;
pub mod value;

pub use audit::{
    AuditEntry, AuditLog, AuditSink, CompositeAuditSink, NoopAuditSink, StatementKind,
    TracingAuditSink, render,
};
pub use builder::{Aggregate, CompiledStatement, JoinKind, StatementBuilder};
pub use condition::{Condition, InValues, Op, Operand, Predicate, WhereMap};
pub use config::{BuilderConfig, DEFAULT_PAGE_SIZE};
pub use error::{SormError, SormResult};
pub use executor::{ExecResult, Executor, Row};
pub use ident::quote_ident;
pub use value::{FieldValue, Payload, RawValue, Value, raw};
