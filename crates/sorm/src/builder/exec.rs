//! Terminal operations: compile, audit, execute, reset.
//!
//! Every terminal operation swaps the accumulated [`Statement`] out of the
//! builder synchronously, before the returned future is first polled. The
//! builder is therefore back to its defaults on every path, and the future
//! does not borrow the builder.

use super::StatementBuilder;
use super::statement::{CompiledStatement, Statement};
use crate::audit::AuditEntry;
use crate::error::{SormError, SormResult};
use crate::executor::{Executor, Row};
use crate::ident::{quote_ident, split_list};
use crate::value::{FieldValue, Payload, RawValue};
use std::collections::BTreeMap;
use std::future::Future;

/// SQL aggregate function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    Sum,
    Max,
    Min,
    Avg,
    Count,
}

impl Aggregate {
    pub fn as_sql(self) -> &'static str {
        match self {
            Aggregate::Sum => "SUM",
            Aggregate::Max => "MAX",
            Aggregate::Min => "MIN",
            Aggregate::Avg => "AVG",
            Aggregate::Count => "COUNT",
        }
    }
}

/// Parse one aggregate cell. Missing or empty cells (e.g. `SUM` over no rows) are 0.
fn parse_cell(row: &Row, key: &str, column: &str) -> SormResult<i64> {
    let text = row.get(key).map(|s| s.trim()).unwrap_or_default();
    if text.is_empty() {
        return Ok(0);
    }
    text.parse::<i64>()
        .map_err(|e| SormError::type_conversion(column, text, e))
}

impl StatementBuilder {
    fn take_statement(&mut self) -> Statement {
        std::mem::replace(&mut self.stmt, Statement::new(&self.config))
    }

    /// Take the state out, compile it, and audit the result.
    fn finish(
        &mut self,
        compile: impl FnOnce(&Statement) -> SormResult<CompiledStatement>,
    ) -> SormResult<CompiledStatement> {
        let stmt = self.take_statement();
        let compiled = compile(&stmt).inspect_err(|e| {
            tracing::debug!(target: "sorm.sql", error = %e, "statement rejected before execution");
        })?;

        tracing::debug!(
            target: "sorm.sql",
            kind = compiled.kind.keyword(),
            arg_count = compiled.args.len(),
            sql = %compiled.sql,
        );

        if stmt.audit {
            let entry = AuditEntry::new(compiled.kind, compiled.sql.clone(), compiled.args.clone());
            self.audit_sink.record(&entry);
        }
        Ok(compiled)
    }

    // ==================== Reads ====================

    /// Run the SELECT and return every row that could be read.
    ///
    /// Rows the executor fails to materialize are skipped (and logged) so
    /// one malformed row does not fail the whole fetch.
    pub fn fetch_all<'c, E: Executor>(
        &mut self,
        conn: &'c E,
    ) -> impl Future<Output = SormResult<Vec<Row>>> + Send + use<'c, E> {
        let page_size = self.config.default_page_size;
        let compiled = self.finish(|stmt| stmt.compile_select(page_size));
        async move {
            let compiled = compiled?;
            let rows = conn.query(&compiled.sql, &compiled.args).await?;
            let mut out = Vec::with_capacity(rows.len());
            for row in rows {
                match row {
                    Ok(row) => out.push(row),
                    Err(e) => {
                        tracing::warn!(target: "sorm.sql", error = %e, "skipping row that failed to scan");
                    }
                }
            }
            Ok(out)
        }
    }

    /// Run the SELECT with `LIMIT 1` (unless a limit is set) and return the
    /// first row, or an empty row when nothing matched.
    pub fn fetch_one<'c, E: Executor>(
        &mut self,
        conn: &'c E,
    ) -> impl Future<Output = SormResult<Row>> + Send + use<'c, E> {
        if self.stmt.limit == 0 {
            self.stmt.limit = 1;
        }
        let rows = self.fetch_all(conn);
        async move { Ok(rows.await?.into_iter().next().unwrap_or_default()) }
    }

    /// `SELECT COUNT(*)` over the current conditions.
    pub fn count<'c, E: Executor>(
        &mut self,
        conn: &'c E,
    ) -> impl Future<Output = SormResult<i64>> + Send + use<'c, E> {
        const FIELD: &str = "COUNT(*)";
        let row = self.raw_fields(FIELD).fetch_one(conn);
        async move { parse_cell(&row.await?, FIELD, FIELD) }
    }

    /// Apply `func` to each comma-separated column and parse the results as
    /// integers, keyed by the column names as given.
    pub fn aggregate<'c, E: Executor>(
        &mut self,
        conn: &'c E,
        columns: &str,
        func: Aggregate,
    ) -> impl Future<Output = SormResult<BTreeMap<String, i64>>> + Send + use<'c, E> {
        let requested: Vec<(String, String)> = split_list(columns)
            .map(|c| (c.to_string(), format!("{}({})", func.as_sql(), quote_ident(c))))
            .collect();
        let exprs: Vec<&str> = requested.iter().map(|(_, e)| e.as_str()).collect();
        let row = self.raw_fields(&exprs.join(",")).fetch_one(conn);

        async move {
            let row = row.await?;
            let mut out = BTreeMap::new();
            for (column, expr) in requested {
                let value = parse_cell(&row, &expr, &column)?;
                out.insert(column, value);
            }
            Ok(out)
        }
    }

    /// `SUM` of each comma-separated column.
    pub fn sum<'c, E: Executor>(
        &mut self,
        conn: &'c E,
        columns: &str,
    ) -> impl Future<Output = SormResult<BTreeMap<String, i64>>> + Send + use<'c, E> {
        self.aggregate(conn, columns, Aggregate::Sum)
    }

    /// `MAX` of each comma-separated column.
    pub fn max<'c, E: Executor>(
        &mut self,
        conn: &'c E,
        columns: &str,
    ) -> impl Future<Output = SormResult<BTreeMap<String, i64>>> + Send + use<'c, E> {
        self.aggregate(conn, columns, Aggregate::Max)
    }

    /// `MIN` of each comma-separated column.
    pub fn min<'c, E: Executor>(
        &mut self,
        conn: &'c E,
        columns: &str,
    ) -> impl Future<Output = SormResult<BTreeMap<String, i64>>> + Send + use<'c, E> {
        self.aggregate(conn, columns, Aggregate::Min)
    }

    /// `AVG` of each comma-separated column.
    ///
    /// Fractional averages fail with [`SormError::TypeConversion`].
    pub fn avg<'c, E: Executor>(
        &mut self,
        conn: &'c E,
        columns: &str,
    ) -> impl Future<Output = SormResult<BTreeMap<String, i64>>> + Send + use<'c, E> {
        self.aggregate(conn, columns, Aggregate::Avg)
    }

    // ==================== Writes ====================

    /// INSERT `data` and return the generated id.
    pub fn insert<'c, E: Executor>(
        &mut self,
        conn: &'c E,
        data: Payload,
    ) -> impl Future<Output = SormResult<u64>> + Send + use<'c, E> {
        let compiled = self.finish(|stmt| stmt.compile_insert(&data));
        async move {
            let compiled = compiled?;
            let result = conn.execute(&compiled.sql, &compiled.args).await?;
            Ok(result.last_insert_id)
        }
    }

    /// UPDATE with `data` and return the number of affected rows.
    pub fn update<'c, E: Executor>(
        &mut self,
        conn: &'c E,
        data: Payload,
    ) -> impl Future<Output = SormResult<u64>> + Send + use<'c, E> {
        let compiled = self.finish(|stmt| stmt.compile_update(&data));
        async move {
            let compiled = compiled?;
            let result = conn.execute(&compiled.sql, &compiled.args).await?;
            Ok(result.rows_affected)
        }
    }

    /// UPDATE a single column.
    pub fn update_field<'c, E, V>(
        &mut self,
        conn: &'c E,
        column: &str,
        value: V,
    ) -> impl Future<Output = SormResult<u64>> + Send + use<'c, E, V>
    where
        E: Executor,
        V: Into<FieldValue>,
    {
        self.update(conn, Payload::new().set(column, value))
    }

    /// `` SET `col` = `col`+n `` for each entry.
    pub fn increase<'c, E, I, K>(
        &mut self,
        conn: &'c E,
        data: I,
    ) -> impl Future<Output = SormResult<u64>> + Send + use<'c, E, I, K>
    where
        E: Executor,
        I: IntoIterator<Item = (K, u64)>,
        K: AsRef<str>,
    {
        let payload = arithmetic_payload(data, '+');
        self.update(conn, payload)
    }

    /// `` SET `col` = `col`-n `` for each entry.
    pub fn decrease<'c, E, I, K>(
        &mut self,
        conn: &'c E,
        data: I,
    ) -> impl Future<Output = SormResult<u64>> + Send + use<'c, E, I, K>
    where
        E: Executor,
        I: IntoIterator<Item = (K, u64)>,
        K: AsRef<str>,
    {
        let payload = arithmetic_payload(data, '-');
        self.update(conn, payload)
    }

    /// DELETE matching rows and return the number removed.
    pub fn delete<'c, E: Executor>(
        &mut self,
        conn: &'c E,
    ) -> impl Future<Output = SormResult<u64>> + Send + use<'c, E> {
        let compiled = self.finish(Statement::compile_delete);
        async move {
            let compiled = compiled?;
            let result = conn.execute(&compiled.sql, &compiled.args).await?;
            Ok(result.rows_affected)
        }
    }
}

fn arithmetic_payload<K: AsRef<str>>(data: impl IntoIterator<Item = (K, u64)>, op: char) -> Payload {
    data.into_iter()
        .map(|(column, n)| {
            let column = column.as_ref();
            let expr = RawValue::new(format!("{}{}{}", quote_ident(column), op, n));
            (column.to_string(), expr)
        })
        .collect()
}
