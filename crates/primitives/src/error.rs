//! Error types for the comb-primitives crate
//!
//! The crate uses a two-level error hierarchy:
//!
//! - `PrimitivesError`: The top-level error type that wraps all other errors
//! - Component-specific errors: More detailed errors from specific subsystems
//!   (`BmtError`, `ChunkError` and `SplitterError`)
//!
//! ## Example Usage
//!
//! ```
//! use comb_primitives::error::{PrimitivesError, Result};
//! use comb_primitives::ContentChunk;
//!
//! fn build(data: &[u8]) -> Result<ContentChunk> {
//!     ContentChunk::new(data.to_vec())
//! }
//!
//! match build(&[0u8; 5000]) {
//!     Err(PrimitivesError::Chunk(err)) => assert!(err.is_malformed()),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use thiserror::Error;

/// Result type for operations in the primitives crate
pub type Result<T> = std::result::Result<T, PrimitivesError>;

/// Main error type for the primitives crate
#[derive(Error, Debug)]
pub enum PrimitivesError {
    /// Errors from BMT operations
    #[error(transparent)]
    Bmt(#[from] crate::bmt::error::BmtError),

    /// Errors from chunk operations
    #[error(transparent)]
    Chunk(#[from] crate::chunk::error::ChunkError),

    /// Errors from the chunk tree builder
    #[error(transparent)]
    Splitter(#[from] crate::splitter::SplitterError),

    /// Input/output errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed hex input
    #[error("Hex decoding error: {0}")]
    Hex(#[from] alloy_primitives::hex::FromHexError),

    /// Array conversion errors
    #[error("Array conversion error: {0}")]
    ArrayConversion(#[from] std::array::TryFromSliceError),
}
