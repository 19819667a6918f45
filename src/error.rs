//! Error types for listkit.

use crate::ItemId;
use thiserror::Error;

/// All possible errors from the data-access layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The record's id must be set before an update or delete.
    #[error("item id must be set before this operation")]
    MissingItemId,

    /// A staged mutation targeted an item that does not exist in the list.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// A bulk update was attempted on a record whose source item is gone.
    #[error("record {0} is not bound to a fetched item")]
    NotBound(ItemId),

    /// The remote store failed to execute a committed request. The core never
    /// retries these; a configured execution policy may.
    #[error("remote store failure: {0}")]
    Transport(String),
}

impl Error {
    /// Whether a retry of the same commit could reasonably succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

/// Result type for listkit operations.
pub type Result<T> = std::result::Result<T, Error>;
