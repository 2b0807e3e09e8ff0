//! Execution-layer contract consumed by the terminal operations.
//!
//! sorm compiles statements; running them is delegated to an [`Executor`]
//! supplied by the caller (a connection, a transaction, a pool handle, or a
//! test double). Connection setup, pooling and statement preparation all live
//! behind this trait.

use crate::error::SormResult;
use crate::value::Value;
use std::collections::HashMap;

/// One result row. Every column value is delivered as text regardless of the
/// column's storage type, so numeric precision is limited to what survives a
/// text round-trip. `NULL` arrives as an empty string.
pub type Row = HashMap<String, String>;

/// Outcome of an INSERT/UPDATE/DELETE.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
    /// Rows changed by the statement.
    pub rows_affected: u64,
    /// Auto-increment id generated by an INSERT (0 when none).
    pub last_insert_id: u64,
}

impl ExecResult {
    pub fn new(rows_affected: u64, last_insert_id: u64) -> Self {
        Self {
            rows_affected,
            last_insert_id,
        }
    }
}

/// A trait that runs compiled statements against a backend.
///
/// SQL uses `?` placeholders; `args` holds exactly one value per placeholder,
/// left to right. Errors should be returned as
/// [`SormError::Driver`](crate::SormError::Driver) so the original cause is
/// preserved.
pub trait Executor: Send + Sync {
    /// Run a SELECT and return its rows.
    ///
    /// The outer result fails when the statement as a whole fails (prepare,
    /// send, cursor error). A row that cannot be materialized is reported as
    /// an inner `Err`; callers skip such rows and keep the rest.
    fn query(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = SormResult<Vec<SormResult<Row>>>> + Send;

    /// Run an INSERT/UPDATE/DELETE.
    fn execute(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = SormResult<ExecResult>> + Send;
}

impl<E: Executor> Executor for &E {
    fn query(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = SormResult<Vec<SormResult<Row>>>> + Send {
        (**self).query(sql, args)
    }

    fn execute(
        &self,
        sql: &str,
        args: &[Value],
    ) -> impl std::future::Future<Output = SormResult<ExecResult>> + Send {
        (**self).execute(sql, args)
    }
}
