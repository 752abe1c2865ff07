pub mod record;

use std::collections::BTreeMap;

use crate::catalog::schema::{Column, Schema};
use crate::error::{Error, KeyKind, Result};
use crate::index::{RowId, UniqueIndex};
use crate::storage::record::{Conditions, Field, Row};

pub struct Table {
    schema: Schema,
    rows: BTreeMap<RowId, Row>,
    // One per primary-key or unique column, in schema order.
    indexes: Vec<UniqueIndex>,
    next_row_id: RowId,
}

impl Table {
    pub fn new(schema: Schema) -> Self {
        let indexes = schema
            .columns
            .iter()
            .filter(|c| c.is_indexed())
            .map(|c| {
                let kind = if c.is_primary {
                    KeyKind::Primary
                } else {
                    KeyKind::Unique
                };
                UniqueIndex::new(&c.name, kind)
            })
            .collect();

        Self {
            schema,
            rows: BTreeMap::new(),
            indexes,
            next_row_id: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.schema.table_name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[Column] {
        &self.schema.columns
    }

    pub fn index(&self, column: &str) -> Option<&UniqueIndex> {
        self.indexes.iter().find(|i| i.column == column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Snapshot of every row in insertion order.
    pub fn rows(&self) -> Vec<Row> {
        self.rows.values().cloned().collect()
    }

    pub fn insert(&mut self, values: BTreeMap<String, Field>) -> Result<()> {
        let row_id = self.next_row_id;
        self.insert_at(row_id, values)?;
        self.next_row_id += 1;
        Ok(())
    }

    pub fn select(&self, conditions: &Conditions) -> Vec<Row> {
        self.matching_ids(conditions)
            .into_iter()
            .filter_map(|row_id| self.rows.get(&row_id).cloned())
            .collect()
    }

    /// Replaces every matching row with its data merged with `updates`.
    ///
    /// Each new row goes through the same checks as `insert`. The batch is
    /// all-or-nothing: if one merged row is rejected, every matched row gets
    /// its old data back and the error is returned.
    pub fn update(&mut self, conditions: &Conditions, updates: &Conditions) -> Result<usize> {
        let removed: Vec<(RowId, Row)> = self
            .matching_ids(conditions)
            .into_iter()
            .filter_map(|row_id| self.take(row_id).map(|row| (row_id, row)))
            .collect();

        let merged: Vec<(RowId, BTreeMap<String, Field>)> = removed
            .iter()
            .map(|(row_id, row)| (*row_id, row.merged(updates)))
            .collect();

        let mut written = Vec::with_capacity(merged.len());
        for (row_id, data) in merged {
            if let Err(err) = self.insert_at(row_id, data) {
                self.rollback(&written, removed)?;
                return Err(err);
            }
            written.push(row_id);
        }

        Ok(written.len())
    }

    pub fn delete(&mut self, conditions: &Conditions) -> usize {
        self.matching_ids(conditions)
            .into_iter()
            .filter_map(|row_id| self.take(row_id))
            .count()
    }

    fn insert_at(&mut self, row_id: RowId, values: BTreeMap<String, Field>) -> Result<()> {
        self.validate(&values)?;

        for index in &self.indexes {
            if let Some(value) = values.get(&index.column)
                && index.contains(value)
            {
                return Err(Error::ConstraintViolation {
                    kind: index.kind,
                    column: index.column.clone(),
                });
            }
        }

        self.store(row_id, Row::new(values))
    }

    fn validate(&self, values: &BTreeMap<String, Field>) -> Result<()> {
        if let Some(column) = values.keys().find(|k| self.schema.column(k).is_none()) {
            return Err(Error::UnknownColumn {
                table: self.schema.table_name.clone(),
                column: column.clone(),
            });
        }

        for column in &self.schema.columns {
            match values.get(&column.name) {
                None if column.is_primary => {
                    return Err(Error::MissingPrimaryKey(column.name.clone()));
                }
                Some(value) if value.data_type() != column.data_type => {
                    return Err(Error::TypeMismatch {
                        column: column.name.clone(),
                        expected: column.data_type,
                        found: value.data_type(),
                    });
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Puts an already validated row into storage and every index.
    fn store(&mut self, row_id: RowId, row: Row) -> Result<()> {
        for index in &mut self.indexes {
            if let Some(value) = row.get(&index.column) {
                index
                    .insert(value.clone(), row_id)
                    .map_err(|_| Error::IndexCorrupted {
                        column: index.column.clone(),
                        detail: format!("value {} is held by a second row", value),
                    })?;
            }
        }
        self.rows.insert(row_id, row);
        Ok(())
    }

    /// Removes a row from storage and every index.
    fn take(&mut self, row_id: RowId) -> Option<Row> {
        let row = self.rows.remove(&row_id)?;
        for index in &mut self.indexes {
            if let Some(value) = row.get(&index.column) {
                index.remove(value, row_id);
            }
        }
        Some(row)
    }

    fn rollback(&mut self, written: &[RowId], originals: Vec<(RowId, Row)>) -> Result<()> {
        for row_id in written {
            self.take(*row_id);
        }
        for (row_id, row) in originals {
            self.store(row_id, row)?;
        }
        Ok(())
    }

    fn matching_ids(&self, conditions: &Conditions) -> Vec<RowId> {
        if conditions.is_empty() {
            return self.rows.keys().copied().collect();
        }

        // An equality on an indexed column pins down at most one row.
        for index in &self.indexes {
            if let Some(value) = conditions.get(&index.column) {
                return index
                    .get(value)
                    .filter(|row_id| {
                        self.rows
                            .get(row_id)
                            .is_some_and(|row| row.matches(conditions))
                    })
                    .into_iter()
                    .collect();
            }
        }

        self.rows
            .iter()
            .filter(|(_, row)| row.matches(conditions))
            .map(|(row_id, _)| *row_id)
            .collect()
    }
}
