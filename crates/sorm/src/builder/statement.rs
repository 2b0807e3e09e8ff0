//! Accumulated statement state and the four compilers.

use crate::audit::{StatementKind, render};
use crate::condition::Predicate;
use crate::config::BuilderConfig;
use crate::error::{SormError, SormResult};
use crate::ident::{quote_ident, write_ident};
use crate::value::{FieldValue, Payload, Value};
use std::fmt::Write;

/// SQL text plus the arguments for its `?` placeholders, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    pub kind: StatementKind,
    pub sql: String,
    pub args: Vec<Value>,
}

impl CompiledStatement {
    /// Human-readable form with each `?` replaced by its argument text.
    pub fn render(&self) -> String {
        render(&self.sql, &self.args)
    }

    /// Number of `?` placeholders in the SQL text.
    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('?').count()
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.args)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Statement {
    pub(super) prefix: String,
    pub(super) table: String,
    pub(super) alias: String,
    pub(super) fields: Vec<String>,
    pub(super) predicates: Vec<Predicate>,
    pub(super) joins: Vec<String>,
    pub(super) group: String,
    pub(super) having: Option<Predicate>,
    pub(super) orders: Vec<String>,
    pub(super) limit: i64,
    pub(super) offset: i64,
    pub(super) audit: bool,
}

impl Statement {
    pub(super) fn new(config: &BuilderConfig) -> Self {
        Self {
            prefix: config.table_prefix.clone(),
            table: String::new(),
            alias: String::new(),
            fields: Vec::new(),
            predicates: Vec::new(),
            joins: Vec::new(),
            group: String::new(),
            having: None,
            orders: Vec::new(),
            limit: 0,
            offset: 0,
            audit: config.audit_by_default,
        }
    }

    pub(super) fn full_table(&self) -> String {
        format!("{}{}", self.prefix, self.table)
    }

    fn require_table(&self) -> SormResult<String> {
        if self.table.is_empty() {
            return Err(SormError::validation("table cannot be empty"));
        }
        Ok(quote_ident(&self.full_table()))
    }

    /// ` WHERE a AND b`, or ` WHERE 1=1` when `fallback` and nothing is set.
    fn push_where(&self, sql: &mut String, args: &mut Vec<Value>, fallback: bool) {
        if self.predicates.is_empty() {
            if fallback {
                sql.push_str(" WHERE 1=1");
            }
            return;
        }
        sql.push_str(" WHERE ");
        for (i, pred) in self.predicates.iter().enumerate() {
            if i > 0 {
                sql.push_str(" AND ");
            }
            sql.push_str(&pred.sql);
            args.extend(pred.args.iter().cloned());
        }
    }

    fn push_order(&self, sql: &mut String) {
        if !self.orders.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.orders.join(","));
        }
    }

    pub(super) fn compile_select(&self, page_size: u64) -> SormResult<CompiledStatement> {
        if self.fields.is_empty() {
            return Err(SormError::validation("select field cannot be empty"));
        }
        let table = self.require_table()?;

        let mut args = Vec::new();
        let mut sql = format!("SELECT {} FROM {}", self.fields.join(","), table);

        if !self.alias.is_empty() {
            sql.push(' ');
            write_ident(&mut sql, &self.alias);
        }

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        self.push_where(&mut sql, &mut args, true);

        if !self.group.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group);

            if let Some(having) = &self.having {
                sql.push_str(" HAVING ");
                sql.push_str(&having.sql);
                args.extend(having.args.iter().cloned());
            }
        }

        self.push_order(&mut sql);

        if self.limit > 0 {
            let _ = write!(sql, " LIMIT {} OFFSET {}", self.limit, self.offset);
        } else {
            let _ = write!(sql, " LIMIT {},{}", self.offset, page_size);
        }

        Ok(CompiledStatement {
            kind: StatementKind::Select,
            sql,
            args,
        })
    }

    pub(super) fn compile_insert(&self, data: &Payload) -> SormResult<CompiledStatement> {
        if data.is_empty() {
            return Err(SormError::validation("cannot insert empty data"));
        }
        let table = self.require_table()?;

        let mut columns = Vec::with_capacity(data.len());
        let mut values = Vec::with_capacity(data.len());
        let mut args = Vec::with_capacity(data.len());

        for (column, value) in data.iter() {
            columns.push(quote_ident(column));
            match value {
                FieldValue::Bind(v) => {
                    values.push("?".to_string());
                    args.push(v.clone());
                }
                FieldValue::Raw(raw) => values.push(raw.as_sql().to_string()),
            }
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUE ({})",
            table,
            columns.join(","),
            values.join(",")
        );

        Ok(CompiledStatement {
            kind: StatementKind::Insert,
            sql,
            args,
        })
    }

    pub(super) fn compile_update(&self, data: &Payload) -> SormResult<CompiledStatement> {
        if data.is_empty() {
            return Err(SormError::validation("cannot update empty data"));
        }
        let table = self.require_table()?;

        let mut sets = Vec::with_capacity(data.len());
        // Assignment placeholders precede predicate placeholders.
        let mut args = Vec::with_capacity(data.len());

        for (column, value) in data.iter() {
            match value {
                FieldValue::Bind(v) => {
                    sets.push(format!("{} = ?", quote_ident(column)));
                    args.push(v.clone());
                }
                FieldValue::Raw(raw) => {
                    sets.push(format!("{} = {}", quote_ident(column), raw.as_sql()));
                }
            }
        }

        let mut sql = format!("UPDATE {} SET {}", table, sets.join(","));
        self.push_where(&mut sql, &mut args, false);

        Ok(CompiledStatement {
            kind: StatementKind::Update,
            sql,
            args,
        })
    }

    pub(super) fn compile_delete(&self) -> SormResult<CompiledStatement> {
        let table = self.require_table()?;

        let mut args = Vec::new();
        let mut sql = format!("DELETE FROM {}", table);
        self.push_where(&mut sql, &mut args, true);
        self.push_order(&mut sql);

        if self.limit > 0 {
            let _ = write!(sql, " LIMIT {}", self.limit);
        }

        Ok(CompiledStatement {
            kind: StatementKind::Delete,
            sql,
            args,
        })
    }
}
