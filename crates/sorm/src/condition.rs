//! Predicate inputs for WHERE clauses.
//!
//! This module provides [`Op`] (comparison operator), [`Condition`] (one entry
//! of a bulk [`WhereMap`]) and [`Predicate`] (a compiled boolean fragment with
//! its aligned arguments).

use crate::ident::{quote_ident, split_list};
use crate::value::{Value, impl_from_scalars};

/// Comparison operator accepted by the predicate setters.
///
/// # Example
/// ```ignore
/// use sorm::Op;
///
/// assert_eq!(Op::parse("egt"), Some(Op::Egt));
/// assert_eq!(Op::parse("not  like"), Some(Op::NotLike));
/// assert_eq!(Op::Egt.symbol(), ">=");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `=`
    Eq,
    /// `<>`
    Neq,
    /// `>`
    Gt,
    /// `>=`
    Egt,
    /// `<`
    Lt,
    /// `<=`
    Elt,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
    /// `IN (...)`
    In,
    /// `NOT IN (...)`
    NotIn,
}

impl Op {
    /// Parse an operator name case-insensitively (`"eq"`, `"NOT LIKE"`, ...).
    ///
    /// Runs of whitespace between words are collapsed. Unknown names return `None`.
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();
        match normalized.as_str() {
            "EQ" => Some(Op::Eq),
            "NEQ" => Some(Op::Neq),
            "GT" => Some(Op::Gt),
            "EGT" => Some(Op::Egt),
            "LT" => Some(Op::Lt),
            "ELT" => Some(Op::Elt),
            "LIKE" => Some(Op::Like),
            "NOT LIKE" => Some(Op::NotLike),
            "IN" => Some(Op::In),
            "NOT IN" => Some(Op::NotIn),
            _ => None,
        }
    }

    /// The SQL operator text.
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Neq => "<>",
            Op::Gt => ">",
            Op::Egt => ">=",
            Op::Lt => "<",
            Op::Elt => "<=",
            Op::Like => "LIKE",
            Op::NotLike => "NOT LIKE",
            Op::In => "IN",
            Op::NotIn => "NOT IN",
        }
    }

    /// Whether this operator takes a value list.
    pub fn is_list(self) -> bool {
        matches!(self, Op::In | Op::NotIn)
    }
}

/// Values for `IN` / `NOT IN`.
///
/// A string is split on `,` (each entry trimmed, empty entries dropped); a
/// vector is taken element by element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InValues(Vec<Value>);

impl InValues {
    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for InValues {
    fn from(csv: &str) -> Self {
        InValues(split_list(csv).map(Value::from).collect())
    }
}

impl From<String> for InValues {
    fn from(csv: String) -> Self {
        InValues::from(csv.as_str())
    }
}

impl<T: Into<Value>> From<Vec<T>> for InValues {
    fn from(values: Vec<T>) -> Self {
        InValues(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for InValues {
    fn from(values: &[T]) -> Self {
        InValues(values.iter().cloned().map(Into::into).collect())
    }
}

/// The operand of an operator pair in a [`WhereMap`].
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Scalar(Value),
    List(Vec<Value>),
}

impl_from_scalars!(Operand => Operand::Scalar);

impl Operand {
    /// Build a list operand.
    pub fn list<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Operand::List(values.into_iter().map(Into::into).collect())
    }
}

/// One entry of a bulk WHERE map.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Implicit equality: `` `col` = ? ``
    Value(Value),
    /// An operator name with its operand, dispatched through [`Op::parse`].
    ///
    /// Unrecognized operator names are ignored at apply time.
    Pair(String, Operand),
    /// A verbatim fragment with its bound arguments (the key is not used).
    Raw(String, Vec<Value>),
}

impl Condition {
    pub fn pair(op: impl Into<String>, operand: impl Into<Operand>) -> Self {
        Condition::Pair(op.into(), operand.into())
    }

    pub fn raw(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Condition::Raw(sql.into(), args)
    }
}

impl_from_scalars!(Condition => Condition::Value);

/// Ordered bulk condition list, applied left to right.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereMap {
    entries: Vec<(String, Condition)>,
}

impl WhereMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// `` `column` = value ``
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries
            .push((column.into(), Condition::Value(value.into())));
        self
    }

    /// `column` with an operator given by name, e.g. `("age", "egt", 18)`.
    pub fn pair(
        mut self,
        column: impl Into<String>,
        op: impl Into<String>,
        operand: impl Into<Operand>,
    ) -> Self {
        self.entries
            .push((column.into(), Condition::pair(op, operand)));
        self
    }

    /// A verbatim fragment.
    pub fn raw(mut self, sql: impl Into<String>, args: Vec<Value>) -> Self {
        self.entries.push((String::new(), Condition::raw(sql, args)));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<(String, Condition)> {
        self.entries
    }
}

impl<K, C> FromIterator<(K, C)> for WhereMap
where
    K: Into<String>,
    C: Into<Condition>,
{
    fn from_iter<I: IntoIterator<Item = (K, C)>>(iter: I) -> Self {
        WhereMap {
            entries: iter
                .into_iter()
                .map(|(k, c)| (k.into(), c.into()))
                .collect(),
        }
    }
}

/// A compiled boolean fragment and the arguments for its placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub sql: String,
    pub args: Vec<Value>,
}

impl Predicate {
    /// `` `col` OP ? ``
    pub fn compare(column: &str, op: Op, value: Value) -> Self {
        Predicate {
            sql: format!("{} {} ?", quote_ident(column), op.symbol()),
            args: vec![value],
        }
    }

    /// `` `col` IN (?,?,...) `` / `` `col` NOT IN (...) ``.
    ///
    /// An empty set compiles to the constant `1=0` (IN) or `1=1` (NOT IN)
    /// with no arguments, since `IN ()` is not valid SQL.
    pub fn list(column: &str, negated: bool, values: Vec<Value>) -> Self {
        if values.is_empty() {
            let sql = if negated { "1=1" } else { "1=0" };
            return Predicate::raw(sql, Vec::new());
        }
        let op = if negated { Op::NotIn } else { Op::In };
        let placeholders = vec!["?"; values.len()].join(",");
        Predicate {
            sql: format!("{} {} ({})", quote_ident(column), op.symbol(), placeholders),
            args: values,
        }
    }

    /// A caller-supplied fragment, taken verbatim.
    pub fn raw(sql: impl Into<String>, args: Vec<Value>) -> Self {
        Predicate {
            sql: sql.into(),
            args,
        }
    }
}
