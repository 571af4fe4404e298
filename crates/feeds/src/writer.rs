//! Publishing feed updates.

use alloy_primitives::Address;
use bytes::Bytes;
use comb_client::{ChunkClient, ChunkSink};
use comb_primitives::{Chunk, ChunkSigner, ContentChunk, SingleOwnerChunk, SwarmAddress};
use tracing::debug;

use crate::error::Result;
use crate::reader::FeedReader;
use crate::topic::IndexedTopic;

/// Publishes consecutive updates of a feed owned by its signer.
///
/// The index lives in this writer only. Two writers for the same owner and
/// topic will overwrite each other's updates; keeping a single writer per
/// feed is up to the caller.
#[derive(Debug, Clone)]
pub struct FeedWriter<S, K> {
    client: ChunkClient<S>,
    signer: K,
    topic: IndexedTopic,
}

impl<S, K: ChunkSigner> FeedWriter<S, K> {
    /// A writer publishing under `topic`, starting at the topic's index
    pub const fn new(client: ChunkClient<S>, signer: K, topic: IndexedTopic) -> Self {
        Self {
            client,
            signer,
            topic,
        }
    }

    /// Index of the next update
    pub const fn index(&self) -> u64 {
        self.topic.index()
    }

    /// The feed owner
    pub fn owner(&self) -> Address {
        self.signer.owner()
    }

    /// The feed topic
    pub const fn topic(&self) -> &IndexedTopic {
        &self.topic
    }

    /// The client used for uploads
    pub const fn client(&self) -> &ChunkClient<S> {
        &self.client
    }

    /// Sign `payload` as the update at the current index, then advance.
    ///
    /// Nothing is uploaded.
    pub fn next_chunk(&mut self, payload: ContentChunk) -> Result<SingleOwnerChunk> {
        let update = self.sign(payload)?;
        self.topic.advance()?;
        Ok(update)
    }

    /// Wrap `data` in a leaf chunk and sign it as the update at the current
    /// index, then advance.
    ///
    /// Nothing is uploaded.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self, data: impl Into<Bytes>) -> Result<SingleOwnerChunk> {
        self.next_chunk(ContentChunk::new(data)?)
    }

    /// A reader for this feed
    pub fn reader(&self) -> FeedReader<S>
    where
        S: Clone,
    {
        FeedReader::new(self.client.clone(), self.owner(), self.topic.clone())
    }

    fn sign(&self, payload: ContentChunk) -> Result<SingleOwnerChunk> {
        Ok(SingleOwnerChunk::from_content(
            self.topic.current(),
            payload,
            &self.signer,
        )?)
    }
}

impl<S: ChunkSink, K: ChunkSigner> FeedWriter<S, K> {
    /// Publish `data` as the update at the current index.
    ///
    /// The index only advances once the upload has succeeded, so a failed
    /// write can be retried at the same index. Returns the update's address.
    pub async fn write(&mut self, data: impl Into<Bytes>) -> Result<SwarmAddress> {
        let update = self.sign(ContentChunk::new(data)?)?;
        let mut advanced = self.topic.clone();
        advanced.advance()?;

        let address = self.client.upload_chunk(&update).await?;
        debug!(index = self.index(), %address, owner = %self.owner(), "feed update published");

        self.topic = advanced;
        Ok(address)
    }
}
