//! Statement builders for the task and user tables.
//!
//! Predicates accumulate as `(column, operator, value)` triples and render
//! with the placeholder style of the target backend. Values are always bound,
//! never spliced into the statement text; only table and column names are.

use chrono::{DateTime, Utc};

/// Placeholder style of a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
}

impl Dialect {
    /// Placeholder for the 1-based parameter `n`.
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            Dialect::Sqlite => format!("?{n}"),
            Dialect::Postgres => format!("${n}"),
        }
    }
}

/// A bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Text(Option<String>),
    SmallInt(Option<i16>),
    Timestamp(Option<DateTime<Utc>>),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(Some(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(Some(v.to_string()))
    }
}

impl From<Option<String>> for Value {
    fn from(v: Option<String>) -> Self {
        Value::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(Some(v))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
}

impl Op {
    fn as_sql(&self) -> &'static str {
        match self {
            Op::Eq => "=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub op: Op,
    pub value: Value,
}

/// Rendered statement text plus its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Value>,
}

fn render_where(
    sql: &mut String,
    predicates: &[Predicate],
    args: &mut Vec<Value>,
    dialect: Dialect,
) {
    for (i, p) in predicates.iter().enumerate() {
        sql.push_str(if i == 0 { " WHERE " } else { " AND " });
        args.push(p.value.clone());
        sql.push_str(&format!(
            "{} {} {}",
            p.column,
            p.op.as_sql(),
            dialect.placeholder(args.len())
        ));
    }
}

#[derive(Debug, Clone)]
pub struct Select {
    table: String,
    columns: Vec<String>,
    predicates: Vec<Predicate>,
}

impl Select {
    pub fn new(table: &str, columns: &[&str]) -> Self {
        Self {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            predicates: Vec::new(),
        }
    }

    pub fn filter(mut self, column: &str, op: Op, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate {
            column: column.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    /// Adds the predicate only when a value is present.
    pub fn filter_opt<V: Into<Value>>(self, column: &str, op: Op, value: Option<V>) -> Self {
        match value {
            Some(v) => self.filter(column, op, v),
            None => self,
        }
    }

    pub fn build(&self, dialect: Dialect) -> Statement {
        let mut sql = format!("SELECT {} FROM {}", self.columns.join(", "), self.table);
        let mut args = Vec::new();
        render_where(&mut sql, &self.predicates, &mut args, dialect);
        Statement { sql, args }
    }
}

#[derive(Debug, Clone)]
pub struct Insert {
    table: String,
    values: Vec<(String, Value)>,
    returning: Option<String>,
}

impl Insert {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            values: Vec::new(),
            returning: None,
        }
    }

    pub fn value(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.values.push((column.to_string(), value.into()));
        self
    }

    pub fn returning(mut self, column: &str) -> Self {
        self.returning = Some(column.to_string());
        self
    }

    pub fn build(&self, dialect: Dialect) -> Statement {
        let columns: Vec<&str> = self.values.iter().map(|(c, _)| c.as_str()).collect();
        let placeholders: Vec<String> = (1..=self.values.len())
            .map(|n| dialect.placeholder(n))
            .collect();
        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            placeholders.join(", ")
        );
        if let Some(col) = &self.returning {
            sql.push_str(&format!(" RETURNING {col}"));
        }
        Statement {
            sql,
            args: self.values.iter().map(|(_, v)| v.clone()).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Update {
    table: String,
    sets: Vec<(String, Value)>,
    predicates: Vec<Predicate>,
}

impl Update {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            sets: Vec::new(),
            predicates: Vec::new(),
        }
    }

    pub fn set(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.sets.push((column.to_string(), value.into()));
        self
    }

    pub fn filter(mut self, column: &str, op: Op, value: impl Into<Value>) -> Self {
        self.predicates.push(Predicate {
            column: column.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn build(&self, dialect: Dialect) -> Statement {
        let mut args = Vec::new();
        let mut assignments = Vec::with_capacity(self.sets.len());
        for (col, value) in &self.sets {
            args.push(value.clone());
            assignments.push(format!("{col} = {}", dialect.placeholder(args.len())));
        }
        let mut sql = format!("UPDATE {} SET {}", self.table, assignments.join(", "));
        render_where(&mut sql, &self.predicates, &mut args, dialect);
        Statement { sql, args }
    }
}
