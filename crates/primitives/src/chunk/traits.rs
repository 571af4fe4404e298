//! Traits for chunk types and operations
//!
//! This module defines the core traits that all chunk types implement.

use crate::SwarmAddress;
use crate::chunk::error;
use crate::error::Result;
use bytes::Bytes;

/// Type alias for chunk addresses
pub type ChunkAddress = SwarmAddress;

/// Core trait for all chunk types in the system.
pub trait Chunk: Send + Sync + 'static {
    /// Get the network address of this chunk
    fn address(&self) -> &ChunkAddress;

    /// Get the raw payload contained in this chunk
    fn data(&self) -> &Bytes;

    /// Get the total serialized size of this chunk in bytes
    fn size(&self) -> usize;

    /// Serialize to the wire form stored under [`Chunk::address`]
    fn to_bytes(&self) -> Bytes;

    /// Verify that this chunk matches an expected address
    fn verify(&self, expected: &ChunkAddress) -> Result<()> {
        let actual = self.address();
        if actual != expected {
            return Err(error::ChunkError::verification_failed(*expected, *actual).into());
        }
        Ok(())
    }
}

/// Trait for chunks that contain a BMT body
pub trait BmtChunk: Chunk {
    /// Get the span of the chunk data
    fn span(&self) -> u64;
}
