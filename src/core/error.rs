//! Error types and handling for Memory Index
//!
//! Every fallible operation in the crate returns [`Result`]. Population
//! failures are not errors: they are recorded as a message on the engine and
//! read back by the provider for diagnostics.

use crate::core::types::IndexId;
use crate::index::IndexState;
use thiserror::Error;

/// Main result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Memory Index
#[derive(Error, Debug)]
pub enum Error {
    /// The host refused to let an index grow any further
    #[error("Index {index_id} capacity exceeded (limit: {limit} entries)")]
    CapacityExceeded {
        /// Index that hit its limit
        index_id: IndexId,
        /// Entry limit reported by the host
        limit: u64,
    },

    /// Update event that is not a well formed add, change or remove
    #[error("Unsupported update: {0}")]
    UnsupportedUpdate(String),

    /// Next element requested from an exhausted identifier sequence
    #[error("Identifier sequence called with has_next() = false")]
    ExhaustedIterator,

    /// Query routed to an index that is not online
    #[error("Index {index_id} not online yet (state: {state})")]
    IllegalQueryState {
        /// Index that was queried
        index_id: IndexId,
        /// State the index was in
        state: IndexState,
    },

    /// No index registered under this identifier
    #[error("Index not found: {0}")]
    IndexNotFound(IndexId),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Prometheus metrics errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an unsupported update error
    pub fn unsupported_update(msg: impl Into<String>) -> Self {
        Self::UnsupportedUpdate(msg.into())
    }

    /// Check if this error comes from caller misuse rather than the host
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedUpdate(_)
                | Error::ExhaustedIterator
                | Error::IllegalQueryState { .. }
                | Error::IndexNotFound(_)
        )
    }

    /// Check if this error was signalled by the host's resource limits
    pub fn is_capacity_exceeded(&self) -> bool {
        matches!(self, Error::CapacityExceeded { .. })
    }
}
