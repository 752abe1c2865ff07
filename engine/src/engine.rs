use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::Catalog;
use crate::catalog::schema::{Column, Schema};
use crate::error::{Error, Result};
use crate::sql::parser::parse_sql;
use crate::sql::{Command, Conditions, JoinClause, QueryResult, ResultSet};
use crate::storage::Table;
use crate::storage::record::Row;

/// Owns every table. Hosts construct one and pass it to whatever needs it.
#[derive(Default)]
pub struct Database {
    pub catalog: Catalog,
}

impl Database {
    pub fn new() -> Self {
        Self {
            catalog: Catalog::new(),
        }
    }

    pub fn create_table(&mut self, name: &str, columns: Vec<Column>) -> Result<()> {
        if self.catalog.contains(name) {
            return Err(Error::AlreadyExists(name.to_string()));
        }
        let schema = Schema::new(name, columns)?;
        self.catalog.add_table(Table::new(schema))
    }

    pub fn drop_table(&mut self, name: &str) -> Result<()> {
        self.catalog.remove_table(name).map(|_| ())
    }

    pub fn table(&self, name: &str) -> Result<&Table> {
        self.catalog.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.catalog.get_mut(name)
    }

    pub fn table_names(&self) -> BTreeSet<String> {
        self.catalog.names()
    }

    /// Nested-loop equi-join on a column that must carry the same name in
    /// both tables. Merged rows are keyed `"<table>.<column>"`.
    ///
    /// Tables that name their join keys differently produce no rows, and a
    /// left row without a value under `column` matches nothing.
    pub fn join(&self, left_name: &str, right_name: &str, column: &str) -> Result<Vec<Row>> {
        let left = self.table(left_name)?;
        let right = self.table(right_name)?;

        let mut joined = Vec::new();
        for left_row in left.rows() {
            let Some(value) = left_row.get(column) else {
                continue;
            };
            let condition = Conditions::from([(column.to_string(), value.clone())]);

            for right_row in right.select(&condition) {
                let mut data = BTreeMap::new();
                left_row.qualify_into(left_name, &mut data);
                right_row.qualify_into(right_name, &mut data);
                joined.push(Row::new(data));
            }
        }
        Ok(joined)
    }

    /// Parses and runs one command.
    pub fn execute_sql(&mut self, sql: &str) -> Result<QueryResult> {
        let command = parse_sql(sql)?;
        self.execute(command)
    }

    /// Runs one command and renders the outcome as text. Failures become
    /// messages; nothing here can fail.
    pub fn run(&mut self, sql: &str) -> String {
        match self.execute_sql(sql) {
            Ok(result) => result.to_string(),
            Err(Error::UnknownCommand) => Error::UnknownCommand.to_string(),
            Err(e) => format!("Error: {}", e),
        }
    }

    pub fn execute(&mut self, command: Command) -> Result<QueryResult> {
        match command {
            Command::CreateTable { name, columns } => {
                self.create_table(&name, columns)?;
                Ok(QueryResult::Message(format!("Table created: {}", name)))
            }

            Command::DropTable { table_name } => {
                self.drop_table(&table_name)?;
                Ok(QueryResult::Message(format!("Table dropped: {}", table_name)))
            }

            Command::Insert { table_name, values } => {
                let table = self.table_mut(&table_name)?;
                table.insert(values.into_iter().collect())?;
                Ok(QueryResult::Message("1 row inserted".to_string()))
            }

            Command::Select {
                table_name,
                filter,
                join: None,
            } => {
                let table = self.table(&table_name)?;
                Ok(QueryResult::Data(ResultSet {
                    columns: table.schema().column_names(),
                    rows: table.select(&filter),
                }))
            }

            Command::Select {
                table_name,
                filter,
                join: Some(join),
            } => self.select_join(&table_name, &join, &filter),

            Command::Update {
                table_name,
                assignments,
                filter,
            } => {
                let table = self.table_mut(&table_name)?;
                let count = table.update(&filter, &assignments)?;
                Ok(QueryResult::Message(format!("{} row(s) updated", count)))
            }

            Command::Delete { table_name, filter } => {
                let table = self.table_mut(&table_name)?;
                let count = table.delete(&filter);
                Ok(QueryResult::Message(format!("{} row(s) deleted", count)))
            }

            Command::ShowTables => {
                let names = self.table_names();
                if names.is_empty() {
                    return Ok(QueryResult::Message("No tables".to_string()));
                }
                let listing: Vec<String> = names.into_iter().collect();
                Ok(QueryResult::Message(format!("Tables:\n{}", listing.join("\n"))))
            }
        }
    }

    fn select_join(
        &self,
        left_name: &str,
        join: &JoinClause,
        filter: &Conditions,
    ) -> Result<QueryResult> {
        let filter = self.qualify_filter(left_name, &join.right_table, filter)?;
        let rows: Vec<Row> = self
            .join(left_name, &join.right_table, &join.right_column)?
            .into_iter()
            .filter(|row| row.matches(&filter))
            .collect();

        let mut columns = Vec::new();
        for table_name in [left_name, join.right_table.as_str()] {
            let table = self.table(table_name)?;
            columns.extend(
                table
                    .columns()
                    .iter()
                    .map(|c| format!("{}.{}", table_name, c.name)),
            );
        }

        Ok(QueryResult::Data(ResultSet { columns, rows }))
    }

    /// Rewrites bare column names in a join filter as `"<table>.<column>"`,
    /// picking whichever side declares the column.
    fn qualify_filter(
        &self,
        left_name: &str,
        right_name: &str,
        filter: &Conditions,
    ) -> Result<Conditions> {
        let mut qualified = Conditions::new();
        for (column, value) in filter {
            if column.contains('.') {
                qualified.insert(column.clone(), value.clone());
                continue;
            }

            let mut owners = Vec::new();
            for table_name in [left_name, right_name] {
                if self.table(table_name)?.schema().column(column).is_some() {
                    owners.push(table_name);
                }
            }
            let owner = match owners.as_slice() {
                [owner] => *owner,
                [] => {
                    return Err(Error::UnknownColumn {
                        table: format!("{} JOIN {}", left_name, right_name),
                        column: column.clone(),
                    });
                }
                _ => {
                    return Err(Error::AmbiguousColumn {
                        column: column.clone(),
                    });
                }
            };
            qualified.insert(format!("{}.{}", owner, column), value.clone());
        }
        Ok(qualified)
    }
}
