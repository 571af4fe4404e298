//! Content-addressed chunk implementation
//!
//! This module provides the implementation of content-addressed chunks,
//! which are chunks whose address is the BMT hash of their span and data.

use alloy_primitives::hex;
use bytes::Bytes;
use std::fmt;

use crate::cache::OnceCache;
use crate::error::{PrimitivesError, Result};

use super::bmt_body::BmtBody;
use super::traits::{BmtChunk, Chunk, ChunkAddress};

/// A content-addressed chunk.
///
/// Leaves carry up to 4096 bytes of payload with a span equal to the payload
/// length. Intermediate chunks of a chunk tree carry child references and a
/// span equal to the number of payload bytes beneath them.
#[derive(Debug, Clone)]
pub struct ContentChunk {
    body: BmtBody,
    address_cache: OnceCache<ChunkAddress>,
}

impl ContentChunk {
    /// Create a new leaf chunk, the span being the data length.
    #[must_use = "this returns a new chunk without modifying the input"]
    pub fn new(data: impl Into<Bytes>) -> Result<Self> {
        let body = BmtBody::builder().auto_from_data(data)?.build()?;
        Ok(Self::from_body(body))
    }

    /// Create a chunk with an explicit span.
    ///
    /// Spans of at most 4096 must equal the data length.
    #[must_use = "this returns a new chunk without modifying the input"]
    pub fn with_span(span: u64, data: impl Into<Bytes>) -> Result<Self> {
        let body = BmtBody::builder().with_span(span).with_data(data)?.build()?;
        Ok(Self::from_body(body))
    }

    /// Create a new leaf chunk with a pre-computed address.
    ///
    /// The address is trusted, use [`Chunk::verify`] on a freshly parsed chunk
    /// when it comes from an untrusted source.
    #[must_use = "this returns a new chunk without modifying the input"]
    pub fn with_address(data: impl Into<Bytes>, address: ChunkAddress) -> Result<Self> {
        let body = BmtBody::builder().auto_from_data(data)?.build()?;
        Ok(Self::from_body_with_address(body, address))
    }

    /// Create a ContentChunk from a pre-existing BmtBody.
    #[must_use]
    pub const fn from_body(body: BmtBody) -> Self {
        Self {
            body,
            address_cache: OnceCache::new(),
        }
    }

    /// Create a ContentChunk from a pre-existing BmtBody with a known address.
    #[must_use]
    pub fn from_body_with_address(body: BmtBody, address: ChunkAddress) -> Self {
        Self {
            body,
            address_cache: OnceCache::with_value(address),
        }
    }

    /// The BMT body of this chunk
    pub const fn body(&self) -> &BmtBody {
        &self.body
    }

    /// Whether this chunk is a leaf of its tree
    pub const fn is_leaf(&self) -> bool {
        self.body.is_leaf()
    }
}

impl Chunk for ContentChunk {
    fn address(&self) -> &ChunkAddress {
        self.address_cache.get_or_compute(|| self.body.hash())
    }

    fn data(&self) -> &Bytes {
        self.body.data()
    }

    fn size(&self) -> usize {
        self.body.size()
    }

    fn to_bytes(&self) -> Bytes {
        self.body.to_bytes()
    }
}

impl BmtChunk for ContentChunk {
    fn span(&self) -> u64 {
        self.body.span()
    }
}

impl From<ContentChunk> for Bytes {
    fn from(chunk: ContentChunk) -> Self {
        chunk.body.into()
    }
}

impl TryFrom<Bytes> for ContentChunk {
    type Error = PrimitivesError;

    fn try_from(bytes: Bytes) -> Result<Self> {
        Ok(Self::from_body(BmtBody::try_from(bytes)?))
    }
}

impl TryFrom<&[u8]> for ContentChunk {
    type Error = PrimitivesError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::try_from(Bytes::copy_from_slice(bytes))
    }
}

impl fmt::Display for ContentChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ContentChunk[{}]",
            hex::encode(&self.address().as_bytes()[..8])
        )
    }
}

impl PartialEq for ContentChunk {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for ContentChunk {}

#[cfg(any(test, feature = "arbitrary"))]
impl<'a> arbitrary::Arbitrary<'a> for ContentChunk {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        Ok(Self::from_body(BmtBody::arbitrary(u)?))
    }
}
