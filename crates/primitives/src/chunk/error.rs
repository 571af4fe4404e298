use crate::SwarmAddress;
use alloy_primitives::Address;
use thiserror::Error;

/// Result type for chunk operations
pub type Result<T> = std::result::Result<T, ChunkError>;

/// Errors specific to chunk operations
#[derive(Error, Debug)]
pub enum ChunkError {
    /// Chunk size is invalid
    #[error("Invalid chunk size: {message} (expected: {expected}, got: {actual})")]
    InvalidSize {
        /// What was being checked
        message: &'static str,
        /// Expected (or maximum) size
        expected: usize,
        /// Size encountered
        actual: usize,
    },

    /// Chunk format is invalid
    #[error("Invalid chunk format: {0}")]
    InvalidFormat(String),

    /// Chunk address verification failed
    #[error("Chunk address verification failed: expected {expected}, got {actual}")]
    VerificationFailed {
        /// Address the caller asked for
        expected: SwarmAddress,
        /// Address the content hashes to
        actual: SwarmAddress,
    },

    /// No public key could be recovered from the signature
    #[error("Signature error: {0}")]
    Signature(#[from] alloy_primitives::SignatureError),

    /// Signing failed
    #[error("Signer error: {0}")]
    Signer(#[from] alloy_signer::Error),

    /// The signature is well-formed but belongs to someone else
    #[error("Chunk owner verification failed: expected {expected}, recovered {actual}")]
    OwnerMismatch {
        /// Owner the caller expected
        expected: Address,
        /// Owner recovered from the signature
        actual: Address,
    },
}

impl ChunkError {
    pub(crate) const fn invalid_size(message: &'static str, expected: usize, actual: usize) -> Self {
        Self::InvalidSize {
            message,
            expected,
            actual,
        }
    }

    pub(crate) fn invalid_format<S: Into<String>>(msg: S) -> Self {
        Self::InvalidFormat(msg.into())
    }

    pub(crate) const fn verification_failed(expected: SwarmAddress, actual: SwarmAddress) -> Self {
        Self::VerificationFailed { expected, actual }
    }

    pub(crate) const fn owner_mismatch(expected: Address, actual: Address) -> Self {
        Self::OwnerMismatch { expected, actual }
    }

    /// Whether this error means the buffer was not a well-formed chunk.
    ///
    /// Authentication failures ([`ChunkError::OwnerMismatch`]) and address
    /// mismatches are not malformed: the bytes parsed fine but belong to
    /// someone or something else.
    pub const fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::InvalidSize { .. } | Self::InvalidFormat(_) | Self::Signature(_)
        )
    }
}
