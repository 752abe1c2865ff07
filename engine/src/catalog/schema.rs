use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DataType {
    Integer,
    Boolean,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub is_primary: bool,
    pub is_unique: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub table_name: String,
    pub columns: Vec<Column>,
}

impl DataType {
    /// Maps a type name from a column definition, ignoring case.
    pub fn from_sql(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "INT" | "INTEGER" => Some(DataType::Integer),
            "VARCHAR" | "TEXT" | "CHAR" | "STRING" => Some(DataType::Text),
            "BOOLEAN" | "BOOL" => Some(DataType::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "INT"),
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::Text => write!(f, "VARCHAR"),
        }
    }
}

impl Column {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            is_primary: false,
            is_unique: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    /// Primary-key and unique columns get an index.
    pub fn is_indexed(&self) -> bool {
        self.is_primary || self.is_unique
    }
}

impl Schema {
    pub fn new(table_name: &str, columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(Error::DuplicateColumn {
                    table: table_name.to_string(),
                    column: column.name.clone(),
                });
            }
        }

        Ok(Self {
            table_name: table_name.to_string(),
            columns,
        })
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}
