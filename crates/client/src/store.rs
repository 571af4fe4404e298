//! Chunk store capabilities.
//!
//! A store is anything that can return the wire bytes of a chunk by address
//! ([`ChunkSource`]) and accept wire bytes under an address ([`ChunkSink`]).
//! Remote stores are slow and fallible, so both capabilities are async.

use bytes::Bytes;
use comb_primitives::SwarmAddress;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::future::{self, Future};
use std::sync::Arc;

use crate::error::StoreError;

/// Fetch chunks by address.
pub trait ChunkSource: Send + Sync {
    /// Retrieves the wire bytes stored under `address`.
    ///
    /// Returns [`StoreError::NotFound`] if nothing is stored there.
    fn get(
        &self,
        address: &SwarmAddress,
    ) -> impl Future<Output = Result<Bytes, StoreError>> + Send;
}

/// Store chunks under an address.
pub trait ChunkSink: Send + Sync {
    /// Stores `bytes` under `address`, replacing any previous value.
    fn put(
        &self,
        address: SwarmAddress,
        bytes: Bytes,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

impl<T: ChunkSource> ChunkSource for Arc<T> {
    fn get(
        &self,
        address: &SwarmAddress,
    ) -> impl Future<Output = Result<Bytes, StoreError>> + Send {
        (**self).get(address)
    }
}

impl<T: ChunkSink> ChunkSink for Arc<T> {
    fn put(
        &self,
        address: SwarmAddress,
        bytes: Bytes,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        (**self).put(address, bytes)
    }
}

/// In-memory chunk store (does not persist across restarts).
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    chunks: Arc<RwLock<HashMap<SwarmAddress, Bytes>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored chunks
    pub fn len(&self) -> usize {
        self.chunks.read().len()
    }

    /// Whether the store holds no chunks
    pub fn is_empty(&self) -> bool {
        self.chunks.read().is_empty()
    }

    /// Whether a chunk is stored under `address`
    pub fn contains(&self, address: &SwarmAddress) -> bool {
        self.chunks.read().contains_key(address)
    }

    /// Insert wire bytes directly, bypassing the async capability.
    pub fn insert(&self, address: SwarmAddress, bytes: impl Into<Bytes>) {
        self.chunks.write().insert(address, bytes.into());
    }

    /// Remove the chunk stored under `address`, returning its bytes
    pub fn remove(&self, address: &SwarmAddress) -> Option<Bytes> {
        self.chunks.write().remove(address)
    }

    /// Remove every chunk
    pub fn clear(&self) {
        self.chunks.write().clear();
    }
}

impl ChunkSource for MemoryStore {
    fn get(
        &self,
        address: &SwarmAddress,
    ) -> impl Future<Output = Result<Bytes, StoreError>> + Send {
        let result = self
            .chunks
            .read()
            .get(address)
            .cloned()
            .ok_or(StoreError::NotFound(*address));
        future::ready(result)
    }
}

impl ChunkSink for MemoryStore {
    fn put(
        &self,
        address: SwarmAddress,
        bytes: Bytes,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        self.chunks.write().insert(address, bytes);
        future::ready(Ok(()))
    }
}
