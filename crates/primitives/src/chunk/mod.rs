//! Chunk types and operations
//!
//! This module provides implementations of the chunk types used in the storage system,
//! along with functionality for creating, parsing, and verifying chunks.

mod bmt_body;
mod content;
pub mod error;
mod single_owner;
mod traits;

// Re-export the traits
pub use traits::{BmtChunk, Chunk, ChunkAddress};

// Re-export the concrete chunk types
pub use bmt_body::BmtBody;
pub use content::ContentChunk;
pub use error::ChunkError;
pub use single_owner::{MAX_SOC_PAYLOAD_SIZE, SOC_HEADER_SIZE, SingleOwnerChunk, soc_address};
