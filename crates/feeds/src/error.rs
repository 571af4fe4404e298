//! Error types for feeds and data lists.

use alloy_primitives::Address;
use comb_client::ClientError;
use comb_primitives::{ChunkError, PrimitivesError, SwarmAddress};
use thiserror::Error;

/// Errors that can occur when reading or writing feeds.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Nothing has been published at the address.
    #[error("no feed update at {address} (index {index:?})")]
    NotFound {
        /// Feed index, when the lookup was by index
        index: Option<u64>,
        /// Address that was looked up
        address: SwarmAddress,
    },

    /// The stored chunk is not a valid single-owner chunk for the address.
    #[error("malformed feed update at {address}: {source}")]
    Malformed {
        /// Address that was looked up
        address: SwarmAddress,
        /// Why the chunk was rejected
        #[source]
        source: PrimitivesError,
    },

    /// The update is well-formed but signed by someone other than the feed owner.
    #[error("feed update signed by {actual}, expected {expected}")]
    OwnerMismatch {
        /// The feed owner
        expected: Address,
        /// Owner recovered from the signature
        actual: Address,
    },

    /// The feed index cannot move past `u64::MAX`.
    #[error("feed index exhausted at {0}")]
    IndexExhausted(u64),

    /// A data list update does not hold a content reference.
    #[error("invalid data list pointer: {0}")]
    InvalidPointer(String),

    /// A data list value could not be encoded or decoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// An update could not be built or signed.
    #[error(transparent)]
    Chunk(#[from] PrimitivesError),

    /// The chunk transport failed.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl FeedError {
    /// Classify a failed download of the update at `address`.
    pub(crate) fn from_download(error: ClientError, address: SwarmAddress, index: Option<u64>) -> Self {
        if error.is_not_found() {
            Self::NotFound { index, address }
        } else {
            Self::Client(error)
        }
    }

    /// Classify a rejected update stored at `address`.
    pub(crate) fn from_validation(error: PrimitivesError, address: SwarmAddress) -> Self {
        match error {
            PrimitivesError::Chunk(ChunkError::OwnerMismatch { expected, actual }) => {
                Self::OwnerMismatch { expected, actual }
            }
            source => Self::Malformed { address, source },
        }
    }

    /// Whether nothing was published at the requested index
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for feed operations
pub type Result<T> = std::result::Result<T, FeedError>;
