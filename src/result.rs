//! Tabular query results
//!
//! Database drivers hand back records that repeat their keys on every row.
//! `ResultSet` keeps the header once and the rows as plain arrays, which is
//! also the shape every accessor of the workload returns:
//!
//! ```text
//! {
//!   "header": ["name", "role"],
//!   "rows": [["neo4j", "leader"], ["system", "follower"]]
//! }
//! ```

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell of a result row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Integer(value) => write!(f, "{value}"),
            Value::String(value) => f.write_str(value),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::String(n.to_string()),
            },
            other => Value::String(other.to_string()),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

/// Header plus rows of cells
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new<S: Into<String>>(header: impl IntoIterator<Item = S>) -> Self {
        Self {
            header: header.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<Value>) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether an identical row is already present
    pub fn contains(&self, row: &[Value]) -> bool {
        self.rows.iter().any(|existing| existing.as_slice() == row)
    }

    /// Keep only rows whose cells equal the filter values.
    ///
    /// Every filter key must name a header column, otherwise nothing matches.
    /// A row is appended once for each filter column it matches, so a row
    /// matching two filter entries shows up twice.
    pub fn filter_by_rows(&self, filter: &HashMap<String, Value>) -> ResultSet {
        if filter.is_empty() {
            return self.clone();
        }

        let mut filtered = ResultSet::new(self.header.iter().cloned());
        let indexes: Vec<(usize, &Value)> = filter
            .iter()
            .filter_map(|(key, expected)| {
                self.header
                    .iter()
                    .position(|column| column == key)
                    .map(|index| (index, expected))
            })
            .collect();

        if indexes.len() != filter.len() {
            return filtered;
        }

        for row in &self.rows {
            for (index, expected) in &indexes {
                if row.get(*index) == Some(*expected) {
                    filtered.push(row.clone());
                }
            }
        }

        filtered
    }

    /// Project rows onto the given columns, dropping duplicate projections.
    ///
    /// Columns missing from the header are filled with an empty string. If
    /// none of the columns exist the projection is empty.
    pub fn filter_by_columns(&self, columns: &[String]) -> ResultSet {
        if columns.is_empty() {
            return self.clone();
        }

        let mut projected = ResultSet::new(columns.iter().cloned());
        let indexes: Vec<Option<usize>> = columns
            .iter()
            .map(|column| self.header.iter().position(|h| h == column))
            .collect();

        if indexes.iter().all(Option::is_none) {
            return projected;
        }

        for row in &self.rows {
            let new_row: Vec<Value> = indexes
                .iter()
                .map(|index| match index {
                    Some(i) => row.get(*i).cloned().unwrap_or(Value::Null),
                    None => Value::String(String::new()),
                })
                .collect();

            if !projected.contains(&new_row) {
                projected.push(new_row);
            }
        }

        projected
    }
}
