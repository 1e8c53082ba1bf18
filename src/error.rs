//! Errors surfaced by the table and everything built on it.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// An empty key reached a hashing operation.
    #[error("key must not be empty")]
    InvalidKey,
    /// Lookup or removal of a key with no live slot.
    #[error("key {0:?} not found")]
    KeyNotFound(String),
}
