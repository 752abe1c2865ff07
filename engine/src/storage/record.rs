use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::catalog::schema::DataType;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Field {
    Integer(i32),
    Boolean(bool),
    Text(String),
}

/// Column name to value. A column without an entry is absent.
pub type Conditions = BTreeMap<String, Field>;

/// A stored record. Rows only leave a table as clones, so a caller can never
/// reach the copy a table keeps.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Row {
    data: BTreeMap<String, Field>,
}

impl Field {
    pub fn data_type(&self) -> DataType {
        match self {
            Field::Integer(_) => DataType::Integer,
            Field::Boolean(_) => DataType::Boolean,
            Field::Text(_) => DataType::Text,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Integer(v) => write!(f, "{}", v),
            Field::Boolean(v) => write!(f, "{}", v),
            Field::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i32> for Field {
    fn from(v: i32) -> Self {
        Field::Integer(v)
    }
}

impl From<bool> for Field {
    fn from(v: bool) -> Self {
        Field::Boolean(v)
    }
}

impl From<&str> for Field {
    fn from(v: &str) -> Self {
        Field::Text(v.to_string())
    }
}

impl From<String> for Field {
    fn from(v: String) -> Self {
        Field::Text(v)
    }
}

impl Row {
    pub fn new(data: BTreeMap<String, Field>) -> Self {
        Self { data }
    }

    pub fn get(&self, column: &str) -> Option<&Field> {
        self.data.get(column)
    }

    /// Independent copy of the row's data.
    pub fn to_map(&self) -> BTreeMap<String, Field> {
        self.data.clone()
    }

    pub fn into_map(self) -> BTreeMap<String, Field> {
        self.data
    }

    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when every condition names a present value equal to the given one.
    pub fn matches(&self, conditions: &Conditions) -> bool {
        conditions
            .iter()
            .all(|(column, expected)| self.data.get(column) == Some(expected))
    }

    /// Merges `updates` over this row's data; updates win.
    pub fn merged(&self, updates: &Conditions) -> BTreeMap<String, Field> {
        let mut data = self.data.clone();
        data.extend(updates.iter().map(|(k, v)| (k.clone(), v.clone())));
        data
    }

    /// Copies every column under `"<table>.<column>"` into `target`.
    pub fn qualify_into(&self, table_name: &str, target: &mut BTreeMap<String, Field>) {
        for (column, value) in &self.data {
            target.insert(format!("{}.{}", table_name, column), value.clone());
        }
    }
}

impl<K: Into<String>, V: Into<Field>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
