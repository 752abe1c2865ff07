pub mod catalog;
pub mod engine;
pub mod error;
pub mod index;
pub mod sql;
pub mod storage;

pub use engine::Database;
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
