//! The reusable statement builder.
//!
//! A [`StatementBuilder`] accumulates one statement's intent through chained
//! `&mut self` calls, compiles it to `?`-parameterized SQL, and is reset by
//! every terminal operation so the same instance can serve the next,
//! unrelated statement.
//!
//! ## Lifecycle
//!
//! - Idle: default state (config defaults applied).
//! - Configuring: any setter call.
//! - Compiled / Executed: a terminal operation (`fetch_all`, `insert`, ...)
//!   takes the accumulated state out of the builder, compiles it and hands
//!   the SQL to an [`Executor`](crate::Executor).
//! - Back to Idle: the state is taken *before* compiling, so the builder is
//!   clean again on every path, including validation errors and driver
//!   failures.
//!
//! The builder performs no synchronization. Give each concurrent unit of work
//! its own builder, or serialize access externally.

mod exec;
mod statement;

pub use exec::Aggregate;
pub use statement::CompiledStatement;

use crate::audit::{AuditLog, AuditSink};
use crate::condition::{Condition, InValues, Op, Operand, Predicate, WhereMap};
use crate::config::BuilderConfig;
use crate::error::SormResult;
use crate::ident::{quote_list, split_list};
use crate::value::{Payload, Value};
use statement::Statement;
use std::fmt;
use std::sync::Arc;

/// JOIN flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
        }
    }
}

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    fn as_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

/// Fluent, reusable SQL statement builder.
///
/// # Example
/// ```ignore
/// use sorm::{Payload, StatementBuilder};
///
/// let mut db = StatementBuilder::new();
///
/// let users = db
///     .table("users")
///     .fields("id,name")
///     .eq("status", "active")
///     .gt("age", 18)
///     .desc("created_at")
///     .limit(20)
///     .fetch_all(&conn)
///     .await?;
///
/// // The builder is clean again.
/// let id = db
///     .table("users")
///     .insert(&conn, Payload::new().set("name", "alice"))
///     .await?;
/// ```
pub struct StatementBuilder {
    config: BuilderConfig,
    audit_sink: Arc<dyn AuditSink>,
    stmt: Statement,
}

impl Default for StatementBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StatementBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementBuilder")
            .field("config", &self.config)
            .field("stmt", &self.stmt)
            .finish_non_exhaustive()
    }
}

impl StatementBuilder {
    /// Create a builder with default configuration that audits into
    /// [`AuditLog::global`].
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    /// Create a builder with the given configuration.
    pub fn with_config(config: BuilderConfig) -> Self {
        let stmt = Statement::new(&config);
        Self {
            config,
            audit_sink: Arc::new(AuditLog::global().clone()),
            stmt,
        }
    }

    /// Send audited statements to `sink` instead of the global log.
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = sink;
        self
    }

    /// The configuration this builder resets to.
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    // ==================== Target ====================

    /// Set the table name (the prefix is prepended at compile time).
    pub fn table(&mut self, table: &str) -> &mut Self {
        self.stmt.table = table.trim().to_string();
        self
    }

    /// Override the table prefix for this statement.
    pub fn prefix(&mut self, prefix: &str) -> &mut Self {
        self.stmt.prefix = prefix.to_string();
        self
    }

    /// Set the table alias.
    pub fn alias(&mut self, alias: &str) -> &mut Self {
        self.stmt.alias = alias.trim().to_string();
        self
    }

    /// Prefix + table name.
    pub fn full_table(&self) -> String {
        self.stmt.full_table()
    }

    // ==================== Fields ====================

    /// Append projected fields from a comma-separated list, quoting each.
    ///
    /// `"*"` replaces the field list with a single wildcard. An empty string
    /// is ignored.
    pub fn fields(&mut self, fields: &str) -> &mut Self {
        let fields = fields.trim();
        if fields.is_empty() {
            return self;
        }
        if fields == "*" {
            self.stmt.fields = vec!["*".to_string()];
        } else {
            self.stmt.fields.extend(quote_list(fields));
        }
        self
    }

    /// Replace the projected fields with a pre-formed expression list (no quoting).
    ///
    /// **Warning**: the text is emitted verbatim.
    pub fn raw_fields(&mut self, fields: &str) -> &mut Self {
        if !fields.trim().is_empty() {
            self.stmt.fields = vec![fields.to_string()];
        }
        self
    }

    // ==================== WHERE ====================

    fn compare(&mut self, column: &str, op: Op, value: Value) -> &mut Self {
        self.stmt
            .predicates
            .push(Predicate::compare(column, op, value));
        self
    }

    /// Add WHERE: `` `column` = ? ``
    pub fn eq(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(column, Op::Eq, value.into())
    }

    /// Add WHERE: `` `column` <> ? ``
    pub fn neq(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(column, Op::Neq, value.into())
    }

    /// Add WHERE: `` `column` > ? ``
    pub fn gt(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(column, Op::Gt, value.into())
    }

    /// Add WHERE: `` `column` >= ? ``
    pub fn egt(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(column, Op::Egt, value.into())
    }

    /// Add WHERE: `` `column` < ? ``
    pub fn lt(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(column, Op::Lt, value.into())
    }

    /// Add WHERE: `` `column` <= ? ``
    pub fn elt(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.compare(column, Op::Elt, value.into())
    }

    /// Add WHERE: `` `column` LIKE ? ``
    pub fn like(&mut self, column: &str, pattern: &str) -> &mut Self {
        self.compare(column, Op::Like, pattern.into())
    }

    /// Add WHERE: `` `column` NOT LIKE ? ``
    pub fn not_like(&mut self, column: &str, pattern: &str) -> &mut Self {
        self.compare(column, Op::NotLike, pattern.into())
    }

    /// Add WHERE: `` `column` IN (?,?,...) ``
    ///
    /// Accepts `"1,2,3"` or a vector. An empty set matches nothing (`1=0`).
    pub fn in_list(&mut self, column: &str, values: impl Into<InValues>) -> &mut Self {
        self.stmt
            .predicates
            .push(Predicate::list(column, false, values.into().into_vec()));
        self
    }

    /// Add WHERE: `` `column` NOT IN (?,?,...) ``
    ///
    /// An empty set excludes nothing (`1=1`).
    pub fn not_in(&mut self, column: &str, values: impl Into<InValues>) -> &mut Self {
        self.stmt
            .predicates
            .push(Predicate::list(column, true, values.into().into_vec()));
        self
    }

    /// Apply a bulk condition list, in order.
    ///
    /// Plain values are equality; `(operator, operand)` pairs dispatch on the
    /// case-insensitive operator name (`EQ, NEQ, GT, EGT, LT, ELT, LIKE,
    /// NOT LIKE, IN, NOT IN`). Unknown operators are skipped.
    pub fn where_map(&mut self, conditions: WhereMap) -> &mut Self {
        for (column, condition) in conditions.into_entries() {
            match condition {
                Condition::Value(value) => {
                    self.eq(&column, value);
                }
                Condition::Raw(sql, args) => {
                    self.where_raw(&sql, args);
                }
                Condition::Pair(name, operand) => {
                    let Some(op) = Op::parse(&name) else {
                        tracing::debug!(target: "sorm.sql", column = %column, operator = %name, "ignoring unknown operator");
                        continue;
                    };
                    self.apply_pair(&column, op, operand);
                }
            }
        }
        self
    }

    fn apply_pair(&mut self, column: &str, op: Op, operand: Operand) {
        match (op, operand) {
            (Op::In | Op::NotIn, Operand::Scalar(Value::Text(csv))) => {
                let values = InValues::from(csv.as_str()).into_vec();
                self.stmt
                    .predicates
                    .push(Predicate::list(column, op == Op::NotIn, values));
            }
            (Op::In | Op::NotIn, Operand::Scalar(value)) => {
                self.stmt
                    .predicates
                    .push(Predicate::list(column, op == Op::NotIn, vec![value]));
            }
            (Op::In | Op::NotIn, Operand::List(values)) => {
                self.stmt
                    .predicates
                    .push(Predicate::list(column, op == Op::NotIn, values));
            }
            (op, Operand::Scalar(value)) => {
                self.compare(column, op, value);
            }
            (op, Operand::List(_)) => {
                tracing::debug!(target: "sorm.sql", column = %column, operator = op.symbol(), "ignoring list operand for scalar operator");
            }
        }
    }

    /// Add a caller-supplied WHERE fragment with its arguments.
    ///
    /// **Warning**: the fragment is emitted verbatim; only the arguments are
    /// bound. An empty fragment is ignored.
    pub fn where_raw(&mut self, sql: &str, args: Vec<Value>) -> &mut Self {
        if !sql.trim().is_empty() {
            self.stmt.predicates.push(Predicate::raw(sql, args));
        }
        self
    }

    // ==================== JOIN ====================

    /// Add `<KIND> JOIN <table> ON <on>`. Neither text is validated.
    pub fn join(&mut self, table: &str, on: &str, kind: JoinKind) -> &mut Self {
        self.stmt
            .joins
            .push(format!("{} JOIN {} ON {}", kind.as_sql(), table, on));
        self
    }

    /// Add INNER JOIN.
    pub fn inner_join(&mut self, table: &str, on: &str) -> &mut Self {
        self.join(table, on, JoinKind::Inner)
    }

    /// Add LEFT JOIN.
    pub fn left_join(&mut self, table: &str, on: &str) -> &mut Self {
        self.join(table, on, JoinKind::Left)
    }

    /// Add RIGHT JOIN.
    pub fn right_join(&mut self, table: &str, on: &str) -> &mut Self {
        self.join(table, on, JoinKind::Right)
    }

    // ==================== Grouping & ordering ====================

    /// Set GROUP BY (verbatim).
    pub fn group(&mut self, fields: &str) -> &mut Self {
        self.stmt.group = fields.trim().to_string();
        self
    }

    /// Set HAVING (verbatim) with its arguments. Only emitted under GROUP BY.
    pub fn having(&mut self, sql: &str, args: Vec<Value>) -> &mut Self {
        if !sql.trim().is_empty() {
            self.stmt.having = Some(Predicate::raw(sql, args));
        }
        self
    }

    fn order(&mut self, columns: &str, dir: SortDir) -> &mut Self {
        let items = split_list(columns)
            .map(|c| format!("{} {}", crate::ident::quote_ident(c), dir.as_sql()));
        self.stmt.orders.extend(items);
        self
    }

    /// Append ascending ORDER BY for each comma-separated column.
    pub fn asc(&mut self, columns: &str) -> &mut Self {
        self.order(columns, SortDir::Asc)
    }

    /// Append descending ORDER BY for each comma-separated column.
    pub fn desc(&mut self, columns: &str) -> &mut Self {
        self.order(columns, SortDir::Desc)
    }

    // ==================== Pagination ====================

    /// Set LIMIT. Values `<= 0` are ignored.
    pub fn limit(&mut self, limit: i64) -> &mut Self {
        if limit > 0 {
            self.stmt.limit = limit;
        }
        self
    }

    /// Set OFFSET (negative values clamp to 0).
    pub fn offset(&mut self, offset: i64) -> &mut Self {
        self.stmt.offset = offset.max(0);
        self
    }

    // ==================== Audit ====================

    /// Record this statement in the audit sink when it is executed.
    pub fn enable_audit(&mut self) -> &mut Self {
        self.stmt.audit = true;
        self
    }

    // ==================== State ====================

    /// Discard all accumulated state, returning to the config defaults.
    pub fn reset(&mut self) -> &mut Self {
        self.stmt = Statement::new(&self.config);
        self
    }

    /// Whether nothing has been configured since the last reset.
    pub fn is_pristine(&self) -> bool {
        self.stmt == Statement::new(&self.config)
    }

    /// Current table name (without prefix).
    pub fn table_name(&self) -> &str {
        &self.stmt.table
    }

    /// Current projected fields.
    pub fn field_list(&self) -> &[String] {
        &self.stmt.fields
    }

    /// Number of accumulated WHERE fragments.
    pub fn predicate_count(&self) -> usize {
        self.stmt.predicates.len()
    }

    /// Current LIMIT (0 = none).
    pub fn current_limit(&self) -> i64 {
        self.stmt.limit
    }

    // ==================== Compilers ====================

    /// Compile the current state as a SELECT without executing or resetting.
    pub fn compile_select(&self) -> SormResult<CompiledStatement> {
        self.stmt.compile_select(self.config.default_page_size)
    }

    /// Compile an INSERT of `data` without executing or resetting.
    pub fn compile_insert(&self, data: &Payload) -> SormResult<CompiledStatement> {
        self.stmt.compile_insert(data)
    }

    /// Compile an UPDATE with `data` without executing or resetting.
    pub fn compile_update(&self, data: &Payload) -> SormResult<CompiledStatement> {
        self.stmt.compile_update(data)
    }

    /// Compile a DELETE without executing or resetting.
    pub fn compile_delete(&self) -> SormResult<CompiledStatement> {
        self.stmt.compile_delete()
    }
}
