//! Error types for chunk transport.

use comb_primitives::{PrimitivesError, SwarmAddress};
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a chunk store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No chunk is stored under the address.
    #[error("chunk not found: {0}")]
    NotFound(SwarmAddress),

    /// The store answered with an unexpected status.
    #[error("store returned status {code} for {address}")]
    Status {
        /// The requested address.
        address: SwarmAddress,
        /// Status code reported by the store.
        code: u16,
    },

    /// The store could not be reached.
    #[error("transport error: {0}")]
    Transport(String),
}

impl StoreError {
    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }
}

/// Errors that can occur when moving chunks and chunk trees.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A request did not complete in time.
    #[error("request for {address} timed out after {timeout:?}")]
    Timeout {
        /// The requested address.
        address: SwarmAddress,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The store rejected or failed a request.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A downloaded chunk could not be parsed or verified.
    #[error(transparent)]
    Primitives(#[from] PrimitivesError),

    /// A chunk tree has an inconsistent shape.
    #[error("invalid chunk tree: {0}")]
    InvalidTree(String),
}

impl ClientError {
    pub(crate) fn invalid_tree(message: impl Into<String>) -> Self {
        Self::InvalidTree(message.into())
    }

    /// Whether the error is an elapsed timeout
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Whether the requested chunk does not exist
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(StoreError::NotFound(_)))
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
