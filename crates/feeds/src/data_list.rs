//! Typed lists of values published through a feed.
//!
//! A feed update is limited to a single chunk, so each value is JSON encoded,
//! uploaded as its own chunk tree, and the feed update only holds the tree's
//! root as 64 lowercase hex characters.

use alloy_primitives::Address;
use bytes::Bytes;
use comb_client::{ChunkClient, ChunkSink, ChunkSource};
use comb_primitives::{Chunk, ChunkSigner, SwarmAddress};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;
use tracing::debug;

use crate::error::{FeedError, Result};
use crate::reader::FeedReader;
use crate::topic::{IndexedTopic, next_index};
use crate::writer::FeedWriter;

/// Appends values of type `T` to a feed.
pub struct DataListWriter<S, K, T> {
    feed: FeedWriter<S, K>,
    _marker: PhantomData<fn(&T)>,
}

impl<S, K, T> fmt::Debug for DataListWriter<S, K, T>
where
    FeedWriter<S, K>: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataListWriter").field("feed", &self.feed).finish()
    }
}

impl<S, K: ChunkSigner, T> DataListWriter<S, K, T> {
    /// A writer appending under `topic`
    pub const fn new(client: ChunkClient<S>, signer: K, topic: IndexedTopic) -> Self {
        Self::from_feed(FeedWriter::new(client, signer, topic))
    }

    /// Append through an existing feed writer
    pub const fn from_feed(feed: FeedWriter<S, K>) -> Self {
        Self {
            feed,
            _marker: PhantomData,
        }
    }

    /// Index of the next value
    pub const fn index(&self) -> u64 {
        self.feed.index()
    }

    /// The underlying feed writer
    pub const fn feed(&self) -> &FeedWriter<S, K> {
        &self.feed
    }
}

impl<S: ChunkSink, K: ChunkSigner, T: Serialize> DataListWriter<S, K, T> {
    /// Append `value`, returning the address of the feed update.
    pub async fn write(&mut self, value: &T) -> Result<SwarmAddress> {
        let encoded = serde_json::to_vec(value)?;
        self.write_bytes(&encoded).await
    }

    /// Append a raw payload, returning the address of the feed update.
    pub async fn write_bytes(&mut self, data: &[u8]) -> Result<SwarmAddress> {
        next_index(self.index())?;
        let root = self.feed.client().upload_file(data).await?;
        debug!(index = self.index(), %root, length = data.len(), "data list value uploaded");
        self.feed.write(root.to_hex()).await
    }
}

/// Reads values of type `T` from a feed.
pub struct DataListReader<S, T> {
    feed: FeedReader<S>,
    _marker: PhantomData<fn() -> T>,
}

impl<S, T> fmt::Debug for DataListReader<S, T>
where
    FeedReader<S>: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataListReader").field("feed", &self.feed).finish()
    }
}

impl<S, T> DataListReader<S, T> {
    /// A reader for the list of `owner` under `topic`
    pub const fn new(client: ChunkClient<S>, owner: Address, topic: IndexedTopic) -> Self {
        Self::from_feed(FeedReader::new(client, owner, topic))
    }

    /// Read through an existing feed reader
    pub const fn from_feed(feed: FeedReader<S>) -> Self {
        Self {
            feed,
            _marker: PhantomData,
        }
    }

    /// The underlying feed reader
    pub const fn feed(&self) -> &FeedReader<S> {
        &self.feed
    }
}

impl<S: ChunkSource, T: DeserializeOwned> DataListReader<S, T> {
    /// Value at `index`.
    pub async fn at(&self, index: u64) -> Result<T> {
        let data = self.at_bytes(index).await?;
        Ok(serde_json::from_slice(&data)?)
    }

    /// Raw payload at `index`.
    pub async fn at_bytes(&self, index: u64) -> Result<Bytes> {
        let update = self.feed.chunk_at(index).await?;
        let root = parse_pointer(update.data())?;
        Ok(self.feed.client().download_file(&root).await?)
    }

    /// A cursor reading values from `start` onwards
    pub const fn cursor(&self, start: u64) -> DataListCursor<'_, S, T> {
        DataListCursor {
            list: self,
            index: start,
        }
    }
}

/// Reads consecutive values of a data list.
///
/// The index only advances when a read succeeds.
pub struct DataListCursor<'a, S, T> {
    list: &'a DataListReader<S, T>,
    index: u64,
}

impl<S, T> fmt::Debug for DataListCursor<'_, S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataListCursor").field("index", &self.index).finish_non_exhaustive()
    }
}

impl<S: ChunkSource, T: DeserializeOwned> DataListCursor<'_, S, T> {
    /// Index of the next value to read
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Read the value at the current index and advance.
    ///
    /// A cursor at `u64::MAX` fails without reading.
    #[allow(clippy::should_implement_trait)]
    pub async fn next(&mut self) -> Result<T> {
        let next = next_index(self.index)?;
        let value = self.list.at(self.index).await?;
        self.index = next;
        Ok(value)
    }
}

/// Parse the root reference held by a data list update.
fn parse_pointer(data: &[u8]) -> Result<SwarmAddress> {
    let text = std::str::from_utf8(data)
        .map_err(|e| FeedError::InvalidPointer(format!("not UTF-8: {e}")))?;
    if text.len() != 64 {
        return Err(FeedError::InvalidPointer(format!(
            "expected 64 hex characters, got {}",
            text.len()
        )));
    }
    text.parse()
        .map_err(|e| FeedError::InvalidPointer(format!("{text}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pointer() {
        let root = SwarmAddress::new([0xab; 32]);
        assert_eq!(parse_pointer(root.to_hex().as_bytes()).unwrap(), root);
    }

    #[test]
    fn test_parse_pointer_rejects_garbage() {
        for data in [
            b"".as_slice(),
            b"hello".as_slice(),
            &[0xff, 0xfe],
            "zz".repeat(32).as_bytes(),
            format!("0x{}", "00".repeat(32)).as_bytes(),
        ] {
            assert!(matches!(
                parse_pointer(data),
                Err(FeedError::InvalidPointer(_))
            ));
        }
    }
}
