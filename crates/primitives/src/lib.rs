//! Core primitives for a content-addressed, chunked storage network
//!
//! This crate provides the fundamental types and operations of a Swarm-style
//! storage client: chunk types, address calculation, the binary Merkle tree
//! hash and the chunk tree builder.
//!
//! ## Key Components
//!
//! - **Binary Merkle Tree**: Content addressing of a single chunk ([`bmt::Hasher`])
//! - **Chunks**: Content-addressed and signed data chunks ([`ContentChunk`], [`SingleOwnerChunk`])
//! - **Chunk trees**: Splitting arbitrary input into a tree of chunks ([`FileSplitter`])
//! - **Identity**: Owner addresses and the signing capability ([`ChunkSigner`])
//! - **SwarmAddress**: 256-bit identifiers for network addressing
//!
//! ## Usage Examples
//!
//! ```
//! use comb_primitives::{Chunk, ContentChunk, FileSplitter, SingleOwnerChunk};
//! use alloy_signer_local::PrivateKeySigner;
//! use alloy_primitives::B256;
//!
//! // Content chunks are addressed by the BMT hash of their data
//! let chunk = ContentChunk::new(b"Hello, world!".as_slice()).unwrap();
//! assert_eq!(*chunk.address(), FileSplitter::hash(b"Hello, world!").unwrap());
//!
//! // Single-owner chunks are addressed by their id and owner
//! let wallet = PrivateKeySigner::random();
//! let soc = SingleOwnerChunk::new(B256::ZERO, b"Signed data".as_slice(), &wallet).unwrap();
//! let parsed = SingleOwnerChunk::validate(soc.to_bytes(), &wallet.address()).unwrap();
//! assert_eq!(parsed.address(), soc.address());
//! ```

// Re-export dependencies that are part of our public API
pub use bytes;

pub mod address;
pub mod bmt;
mod cache;
pub mod chunk;
pub mod error;
pub mod identity;
pub mod splitter;

// Re-export core constants
pub use bmt::MAX_DATA_LENGTH as MAX_CHUNK_SIZE;

// Re-export core types
pub use address::SwarmAddress;
pub use error::{PrimitivesError, Result};

// Core BMT functionality
pub use bmt::Hasher;

// Core chunk functionality
pub use chunk::{
    BmtBody,
    BmtChunk,
    // Core traits
    Chunk,
    ChunkAddress,
    ChunkError,

    // Concrete chunk types
    ContentChunk,
    MAX_SOC_PAYLOAD_SIZE,
    SingleOwnerChunk,
    soc_address,
};

// Owner identities
pub use identity::{ChunkSigner, public_key_to_address, verifying_key_to_address};

// Chunk trees
pub use splitter::{ChunkStream, FileSplitter, SplitterError, TreeChunk};
