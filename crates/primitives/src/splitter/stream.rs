//! Streaming side of the chunk tree builder.

use futures::channel::{mpsc, oneshot};
use futures::stream::{FusedStream, Stream, StreamExt};
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::trace;

use super::{SplitterError, TreeChunk};
use crate::SwarmAddress;

/// Producer half held by an emitting [`FileSplitter`](super::FileSplitter).
#[derive(Debug)]
pub(super) struct Emitter {
    chunks: mpsc::UnboundedSender<TreeChunk>,
    root: oneshot::Sender<SwarmAddress>,
}

impl Emitter {
    pub(super) fn channel() -> (Self, ChunkStream) {
        let (chunks_tx, chunks_rx) = mpsc::unbounded();
        let (root_tx, root_rx) = oneshot::channel();

        (
            Self {
                chunks: chunks_tx,
                root: root_tx,
            },
            ChunkStream {
                chunks: chunks_rx,
                root: root_rx,
            },
        )
    }

    /// Queue a chunk. Returns false once the consumer has gone away.
    pub(super) fn send(&self, chunk: TreeChunk) -> bool {
        self.chunks.unbounded_send(chunk).is_ok()
    }

    /// Publish the root and close the chunk stream.
    pub(super) fn finish(self, root: SwarmAddress) {
        if self.root.send(root).is_err() {
            trace!(%root, "root receiver dropped");
        }
    }
}

/// Chunks emitted by a [`FileSplitter`](super::FileSplitter), in production order.
///
/// Every leaf appears before the intermediate chunk that references it and the
/// root is the last chunk. The queue is unbounded: the splitter never waits for
/// the consumer. Dropping the stream stops emission without affecting hashing.
#[derive(Debug)]
pub struct ChunkStream {
    chunks: mpsc::UnboundedReceiver<TreeChunk>,
    root: oneshot::Receiver<SwarmAddress>,
}

impl ChunkStream {
    /// Root address of the tree, once the splitter has been finalized.
    ///
    /// Resolves to [`SplitterError::Abandoned`] if the splitter is dropped first.
    /// Chunks not yet read from the stream are discarded.
    pub async fn root(self) -> Result<SwarmAddress, SplitterError> {
        self.root.await.map_err(|_| SplitterError::Abandoned)
    }
}

impl Stream for ChunkStream {
    type Item = TreeChunk;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.chunks.poll_next_unpin(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl FusedStream for ChunkStream {
    fn is_terminated(&self) -> bool {
        self.chunks.is_terminated()
    }
}
