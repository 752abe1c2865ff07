use std::fmt;

use thiserror::Error;

use crate::catalog::schema::DataType;

pub type Result<T> = std::result::Result<T, Error>;

/// Which constraint an index enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Primary,
    Unique,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyKind::Primary => write!(f, "primary"),
            KeyKind::Unique => write!(f, "unique"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Syntax error: {0}")]
    Syntax(String),
    #[error("Unknown command")]
    UnknownCommand,
    #[error("Table does not exist: {0}")]
    NotFound(String),
    #[error("Table already exists: {0}")]
    AlreadyExists(String),
    #[error("Primary key cannot be null: {0}")]
    MissingPrimaryKey(String),
    #[error("Invalid type for column {column}: expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        found: DataType,
    },
    #[error("Duplicate value for {kind} key: {column}")]
    ConstraintViolation { kind: KeyKind, column: String },
    #[error("Unknown column {column} in table {table}")]
    UnknownColumn { table: String, column: String },
    #[error("Column {column} is ambiguous: qualify it as table.{column}")]
    AmbiguousColumn { column: String },
    #[error("Duplicate column {column} in table {table}")]
    DuplicateColumn { table: String, column: String },
    #[error("Index on {column} is inconsistent: {detail}")]
    IndexCorrupted { column: String, detail: String },
}

impl From<sqlparser::tokenizer::TokenizerError> for Error {
    fn from(err: sqlparser::tokenizer::TokenizerError) -> Self {
        Error::Syntax(err.to_string())
    }
}
