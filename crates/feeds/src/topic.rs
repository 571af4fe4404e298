//! Indexed feed topics.
//!
//! Update `i` of a feed is signed under the identifier
//! `keccak256(topic || hex64(i))`, where `hex64(i)` is the 64-character,
//! zero-padded, lowercase hexadecimal rendering of `i` as ASCII.

use alloy_primitives::{B256, Keccak256};
use bytes::Bytes;

use crate::error::{FeedError, Result};

/// Topic used when none is given: 20 zero bytes.
pub const DEFAULT_TOPIC: [u8; 20] = [0u8; 20];

/// A feed topic together with the index of the next update.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexedTopic {
    topic: Bytes,
    index: u64,
}

impl Default for IndexedTopic {
    fn default() -> Self {
        Self::new(Bytes::from_static(&DEFAULT_TOPIC))
    }
}

impl IndexedTopic {
    /// A topic starting at index 0
    pub fn new(topic: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            index: 0,
        }
    }

    /// Start at `index` instead of 0
    #[must_use]
    pub const fn with_index(mut self, index: u64) -> Self {
        self.index = index;
        self
    }

    /// The raw topic bytes
    pub fn topic(&self) -> &[u8] {
        &self.topic
    }

    /// Index of the next update
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Identifier of update `index`.
    pub fn at(&self, index: u64) -> B256 {
        let mut hasher = Keccak256::new();
        hasher.update(&self.topic);
        hasher.update(format!("{index:064x}"));
        hasher.finalize()
    }

    /// Identifier at the current index
    pub fn current(&self) -> B256 {
        self.at(self.index)
    }

    /// Identifier at the current index, then move to the next one.
    ///
    /// Fails without moving once the index is `u64::MAX`.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<B256> {
        let id = self.current();
        self.advance()?;
        Ok(id)
    }

    /// Move to the next index.
    pub fn advance(&mut self) -> Result<()> {
        self.index = next_index(self.index)?;
        Ok(())
    }
}

/// The index following `index`.
pub(crate) fn next_index(index: u64) -> Result<u64> {
    index.checked_add(1).ok_or(FeedError::IndexExhausted(index))
}
