use std::collections::HashMap;

use crate::error::{Error, KeyKind, Result};
use crate::storage::record::Field;

/// Position of a row inside its table. Ids only grow, so ordering by id is
/// insertion order.
pub type RowId = u64;

#[derive(Debug)]
pub struct UniqueIndex {
    pub column: String,
    pub kind: KeyKind,
    // Key: the column value. Value: the one row holding it.
    map: HashMap<Field, RowId>,
}

impl UniqueIndex {
    pub fn new(column: &str, kind: KeyKind) -> Self {
        Self {
            column: column.to_string(),
            kind,
            map: HashMap::new(),
        }
    }

    pub fn get(&self, key: &Field) -> Option<RowId> {
        self.map.get(key).copied()
    }

    pub fn contains(&self, key: &Field) -> bool {
        self.map.contains_key(key)
    }

    pub fn insert(&mut self, key: Field, row_id: RowId) -> Result<()> {
        if self.map.contains_key(&key) {
            return Err(Error::ConstraintViolation {
                kind: self.kind,
                column: self.column.clone(),
            });
        }
        self.map.insert(key, row_id);
        Ok(())
    }

    /// Drops the entry for `key` if it points at `row_id`.
    pub fn remove(&mut self, key: &Field, row_id: RowId) {
        if self.map.get(key) == Some(&row_id) {
            self.map.remove(key);
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
