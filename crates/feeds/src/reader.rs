//! Reading feed updates.

use alloy_primitives::Address;
use comb_client::{ChunkClient, ChunkSource};
use comb_primitives::{Chunk, ContentChunk, SingleOwnerChunk, SwarmAddress, soc_address};
use tracing::{debug, trace};

use crate::error::{FeedError, Result};
use crate::topic::{IndexedTopic, next_index};

/// Reads the updates of the feed identified by an owner and a topic.
///
/// The topic's own index is not used by the reader; every lookup names the
/// index it wants.
#[derive(Debug, Clone)]
pub struct FeedReader<S> {
    client: ChunkClient<S>,
    owner: Address,
    topic: IndexedTopic,
}

impl<S> FeedReader<S> {
    /// A reader for the feed of `owner` under `topic`
    pub const fn new(client: ChunkClient<S>, owner: Address, topic: IndexedTopic) -> Self {
        Self {
            client,
            owner,
            topic,
        }
    }

    /// The feed owner
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// The feed topic
    pub const fn topic(&self) -> &IndexedTopic {
        &self.topic
    }

    /// The client used for downloads
    pub const fn client(&self) -> &ChunkClient<S> {
        &self.client
    }

    /// Network address of update `index`
    pub fn address_at(&self, index: u64) -> SwarmAddress {
        soc_address(&self.topic.at(index), &self.owner)
    }
}

impl<S: ChunkSource> FeedReader<S> {
    /// Download the update stored at `address` and return its payload.
    ///
    /// The update must be signed by the feed owner and stored under its own
    /// address.
    pub async fn load(&self, address: &SwarmAddress) -> Result<ContentChunk> {
        self.fetch(address, None).await
    }

    /// Payload of update `index`.
    pub async fn chunk_at(&self, index: u64) -> Result<ContentChunk> {
        let address = self.address_at(index);
        trace!(index, %address, "reading feed update");
        self.fetch(&address, Some(index)).await
    }

    /// A cursor reading updates from `start` onwards
    pub const fn cursor(&self, start: u64) -> FeedCursor<'_, S> {
        FeedCursor {
            reader: self,
            index: start,
        }
    }

    async fn fetch(&self, address: &SwarmAddress, index: Option<u64>) -> Result<ContentChunk> {
        let bytes = self
            .client
            .download(address)
            .await
            .map_err(|e| FeedError::from_download(e, *address, index))?;

        let soc = SingleOwnerChunk::validate(bytes, &self.owner)
            .and_then(|soc| soc.verify(address).map(|()| soc))
            .map_err(|e| FeedError::from_validation(e, *address))?;

        debug!(?index, %address, size = soc.payload().data().len(), "feed update loaded");
        Ok(soc.into_payload())
    }
}

/// Reads consecutive updates of a feed.
///
/// The index only advances when a read succeeds, so a cursor that hit a
/// missing update can be polled again once it has been published.
#[derive(Debug)]
pub struct FeedCursor<'a, S> {
    reader: &'a FeedReader<S>,
    index: u64,
}

impl<S: ChunkSource> FeedCursor<'_, S> {
    /// Index of the next update to read
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Read the update at the current index and advance.
    ///
    /// A cursor at `u64::MAX` fails without reading.
    #[allow(clippy::should_implement_trait)]
    pub async fn next(&mut self) -> Result<ContentChunk> {
        let next = next_index(self.index)?;
        let chunk = self.reader.chunk_at(self.index).await?;
        self.index = next;
        Ok(chunk)
    }
}
