mod clause;
pub mod parser;

use std::fmt;

use serde::Serialize;

use crate::catalog::schema::Column;
pub use crate::storage::record::Conditions;
use crate::storage::record::{Field, Row};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateTable {
        name: String,
        columns: Vec<Column>,
    },
    DropTable {
        table_name: String,
    },
    Insert {
        table_name: String,
        // Column name and value, in the order they were written
        values: Vec<(String, Field)>,
    },
    Select {
        table_name: String,
        filter: Conditions,
        join: Option<JoinClause>,
    },
    Update {
        table_name: String,
        assignments: Conditions,
        filter: Conditions,
    },
    Delete {
        table_name: String,
        filter: Conditions,
    },
    ShowTables,
}

/// `JOIN <right_table> ON <left_table>.<left_column> = <right_table>.<right_column>`.
///
/// Only `right_column` is used as the join key, and it is looked up under the
/// same name on both sides.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinClause {
    pub left_table: String,
    pub left_column: String,
    pub right_table: String,
    pub right_column: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum QueryResult {
    Message(String),
    Data(ResultSet),
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row values in column order; `None` where the row has no value.
    pub fn values(&self) -> impl Iterator<Item = Vec<Option<&Field>>> + '_ {
        self.rows
            .iter()
            .map(move |row| self.columns.iter().map(|c| row.get(c)).collect())
    }
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return write!(f, "0 rows");
        }

        writeln!(f, "{}", self.columns.join(" | "))?;
        writeln!(f, "{}", "-".repeat(50))?;
        for values in self.values() {
            let line: Vec<String> = values
                .iter()
                .map(|v| match v {
                    Some(field) => field.to_string(),
                    None => "NULL".to_string(),
                })
                .collect();
            writeln!(f, "{}", line.join(" | "))?;
        }
        write!(f, "\n{} row(s)", self.rows.len())
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Message(msg) => write!(f, "{}", msg),
            QueryResult::Data(data) => write!(f, "{}", data),
        }
    }
}
