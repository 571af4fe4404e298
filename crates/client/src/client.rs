//! Chunk and chunk tree transport over a [`ChunkSource`] / [`ChunkSink`].

use bytes::{Bytes, BytesMut};
use comb_primitives::bmt::SEGMENT_SIZE;
use comb_primitives::{Chunk, ContentChunk, FileSplitter, SwarmAddress, TreeChunk};
use futures::{Stream, StreamExt, TryStreamExt, stream, try_join};
use std::time::Duration;
use tracing::{debug, trace};

use crate::error::{ClientError, Result};
use crate::store::{ChunkSink, ChunkSource};

/// Default number of chunk uploads kept in flight.
pub const DEFAULT_UPLOAD_CONCURRENCY: usize = 16;

/// Moves chunks and whole chunk trees in and out of a store.
///
/// Every request is bounded by the client timeout, if one is set. An elapsed
/// timeout is reported as [`ClientError::Timeout`], never as a store error.
#[derive(Debug, Clone)]
pub struct ChunkClient<S> {
    store: S,
    timeout: Option<Duration>,
    concurrency: usize,
}

impl<S> ChunkClient<S> {
    /// A client without a request timeout
    pub const fn new(store: S) -> Self {
        Self {
            store,
            timeout: None,
            concurrency: DEFAULT_UPLOAD_CONCURRENCY,
        }
    }

    /// Bound every request by `timeout`
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Number of chunk uploads kept in flight by tree uploads (at least one)
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = if concurrency == 0 { 1 } else { concurrency };
        self
    }

    /// The request timeout, if any
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The underlying store
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<S: ChunkSource> ChunkClient<S> {
    /// Raw wire bytes stored under `address`.
    pub async fn download(&self, address: &SwarmAddress) -> Result<Bytes> {
        match self.timeout {
            Some(timeout) => self.download_with_timeout(address, timeout).await,
            None => Ok(self.store.get(address).await?),
        }
    }

    /// Raw wire bytes stored under `address`, with an explicit timeout.
    pub async fn download_with_timeout(
        &self,
        address: &SwarmAddress,
        timeout: Duration,
    ) -> Result<Bytes> {
        trace!(%address, "downloading chunk");
        let bytes = tokio::time::timeout(timeout, self.store.get(address))
            .await
            .map_err(|_| ClientError::Timeout {
                address: *address,
                timeout,
            })??;
        Ok(bytes)
    }

    /// Download a content chunk and check that it hashes to `address`.
    pub async fn download_content(&self, address: &SwarmAddress) -> Result<ContentChunk> {
        let bytes = self.download(address).await?;
        let chunk = ContentChunk::try_from(bytes)?;
        chunk.verify(address)?;
        Ok(chunk)
    }

    /// Leaf payloads of the tree rooted at `root`, depth-first in original order.
    ///
    /// Chunks are fetched one at a time as the stream is polled. The stream
    /// ends after the first error.
    pub fn download_chunks(&self, root: SwarmAddress) -> impl Stream<Item = Result<Bytes>> + '_ {
        stream::try_unfold(vec![root], move |mut pending| async move {
            while let Some(address) = pending.pop() {
                let chunk = self.download_content(&address).await?;
                if chunk.is_leaf() {
                    trace!(%address, size = chunk.data().len(), "leaf downloaded");
                    return Ok(Some((chunk.data().clone(), pending)));
                }

                let children = child_references(&chunk)?;
                pending.extend(children.into_iter().rev());
            }
            Ok::<_, ClientError>(None)
        })
    }

    /// Download the tree rooted at `root` and join its leaves.
    pub async fn download_file(&self, root: &SwarmAddress) -> Result<Bytes> {
        let data = self
            .download_chunks(*root)
            .try_fold(BytesMut::new(), |mut data, leaf| async move {
                data.extend_from_slice(&leaf);
                Ok(data)
            })
            .await?;

        debug!(%root, length = data.len(), "chunk tree downloaded");
        Ok(data.freeze())
    }
}

impl<S: ChunkSink> ChunkClient<S> {
    /// Store raw wire bytes under `address`.
    pub async fn upload(&self, address: SwarmAddress, bytes: Bytes) -> Result<SwarmAddress> {
        trace!(%address, size = bytes.len(), "uploading chunk");
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.store.put(address, bytes))
                .await
                .map_err(|_| ClientError::Timeout { address, timeout })??,
            None => self.store.put(address, bytes).await?,
        }
        Ok(address)
    }

    /// Store a chunk under its own address.
    pub async fn upload_chunk(&self, chunk: &impl Chunk) -> Result<SwarmAddress> {
        self.upload(*chunk.address(), chunk.to_bytes()).await
    }

    /// Upload every chunk of a stream, stopping at the first failure.
    pub async fn upload_chunks<St, C>(&self, chunks: St) -> Result<()>
    where
        St: Stream<Item = C>,
        C: Chunk,
    {
        chunks
            .map(Ok)
            .try_for_each_concurrent(self.concurrency, |chunk| async move {
                self.upload_chunk(&chunk).await.map(|_| ())
            })
            .await
    }

    /// Split a complete buffer into a chunk tree, upload it and return its root.
    pub async fn upload_file(&self, data: &[u8]) -> Result<SwarmAddress> {
        self.upload_stream(stream::iter([data])).await
    }

    /// Split a stream of buffers into a chunk tree while uploading it.
    ///
    /// Chunks are uploaded as soon as the splitter closes them. A failed upload
    /// stops reading the input.
    pub async fn upload_stream<St, B>(&self, input: St) -> Result<SwarmAddress>
    where
        St: Stream<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut splitter = FileSplitter::emitting();
        let chunks = splitter.take_chunks()?;

        let produce = async move { Ok::<_, ClientError>(splitter.consume(input).await?) };
        let upload = self.upload_chunks(chunks.map(TreeChunk::into_chunk));
        let (root, ()) = try_join!(produce, upload)?;

        debug!(%root, "chunk tree uploaded");
        Ok(root)
    }
}

/// References held by an intermediate chunk, in order.
fn child_references(chunk: &ContentChunk) -> Result<Vec<SwarmAddress>> {
    let data = chunk.data();
    if data.is_empty() || data.len() % SEGMENT_SIZE != 0 {
        return Err(ClientError::invalid_tree(format!(
            "intermediate chunk {} holds {} bytes, not a list of references",
            chunk.address(),
            data.len()
        )));
    }

    Ok(data
        .chunks_exact(SEGMENT_SIZE)
        .map(SwarmAddress::from_slice)
        .collect::<std::result::Result<_, _>>()?)
}
