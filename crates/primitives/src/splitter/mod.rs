//! Chunk tree builder
//!
//! [`FileSplitter`] cuts arbitrary-length input into 4096-byte leaves and builds
//! the 128-ary tree of intermediate chunks above them, incrementally, as data
//! arrives. The root of the tree is the content address of the whole input.
//!
//! Each tree level keeps a buffer of up to 128 child references (or, at level 0,
//! up to 4096 payload bytes). When a buffer fills it is closed into a chunk whose
//! reference is appended to the level above. Finalizing flushes the trailing
//! partial leaf and closes the remaining partial levels bottom-up. A level left
//! with a single reference is carried up unchanged rather than wrapped, so every
//! intermediate chunk has at least two children.
//!
//! An emitting splitter also hands out every chunk it closes through a
//! [`ChunkStream`], so a consumer can upload the tree while it is being built.
//!
//! ```
//! use comb_primitives::splitter::FileSplitter;
//!
//! let mut splitter = FileSplitter::new();
//! splitter.update(b"hello ")?;
//! splitter.update(b"world")?;
//! let root = splitter.finalize()?;
//!
//! assert_eq!(root, FileSplitter::hash(b"hello world")?);
//! # Ok::<(), comb_primitives::PrimitivesError>(())
//! ```

mod error;
mod stream;

#[cfg(test)]
mod tests;

pub use error::SplitterError;
pub use stream::ChunkStream;

use bytes::Bytes;
use futures::{Stream, StreamExt, pin_mut};
use std::fmt;
use std::mem;
use tracing::{debug, trace};

use crate::bmt::{BRANCHES, MAX_DATA_LENGTH, SEGMENT_SIZE};
use crate::SwarmAddress;
use crate::chunk::{BmtChunk, Chunk, ContentChunk};
use crate::error::Result;

use stream::Emitter;

/// Number of tree levels: nine working levels plus the slot for the root of a
/// maximal tree.
pub const LEVELS: usize = 10;

/// A chunk closed by the splitter, with its position in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeChunk {
    chunk: ContentChunk,
    level: usize,
    index: u64,
}

impl TreeChunk {
    /// The chunk itself
    pub const fn chunk(&self) -> &ContentChunk {
        &self.chunk
    }

    /// Unwrap into the chunk
    pub fn into_chunk(self) -> ContentChunk {
        self.chunk
    }

    /// Tree level, 0 for leaves
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Position among the chunks closed at the same level
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Content address of the chunk
    pub fn address(&self) -> &SwarmAddress {
        self.chunk.address()
    }

    /// Number of payload bytes beneath the chunk
    pub fn span(&self) -> u64 {
        self.chunk.span()
    }
}

impl From<TreeChunk> for ContentChunk {
    fn from(chunk: TreeChunk) -> Self {
        chunk.chunk
    }
}

/// Pending content of one tree level.
#[derive(Debug, Default)]
struct Level {
    buffer: Vec<u8>,
    /// Chunks closed at this level so far
    count: u64,
}

/// Incremental chunk tree builder.
pub struct FileSplitter {
    levels: [Level; LEVELS],
    /// Trailing bytes not yet forming a complete leaf
    residual: Vec<u8>,
    /// Payload bytes committed to leaves
    length: u64,
    root: Option<SwarmAddress>,
    emitter: Option<Emitter>,
    stream: Option<ChunkStream>,
    emitting: bool,
}

impl Default for FileSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FileSplitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSplitter")
            .field("length", &self.length)
            .field("residual", &self.residual.len())
            .field("root", &self.root)
            .field("emitting", &self.emitting)
            .finish_non_exhaustive()
    }
}

impl FileSplitter {
    /// A splitter that only computes the root address
    pub fn new() -> Self {
        Self {
            levels: Default::default(),
            residual: Vec::with_capacity(MAX_DATA_LENGTH),
            length: 0,
            root: None,
            emitter: None,
            stream: None,
            emitting: false,
        }
    }

    /// A splitter that also emits every chunk it closes, see [`FileSplitter::take_chunks`]
    pub fn emitting() -> Self {
        let (emitter, stream) = Emitter::channel();
        Self {
            emitter: Some(emitter),
            stream: Some(stream),
            emitting: true,
            ..Self::new()
        }
    }

    /// Root address of a complete buffer
    pub fn hash(data: &[u8]) -> Result<SwarmAddress> {
        let mut splitter = Self::new();
        splitter.update(data)?;
        splitter.finalize()
    }

    /// Wrap at most 4096 bytes as a single leaf, without building a tree.
    pub fn single_chunk(data: impl Into<Bytes>) -> Result<TreeChunk> {
        Ok(TreeChunk {
            chunk: ContentChunk::new(data)?,
            level: 0,
            index: 0,
        })
    }

    /// Hand out the stream of emitted chunks. Can only be called once.
    pub fn take_chunks(&mut self) -> Result<ChunkStream> {
        if !self.emitting {
            return Err(SplitterError::NotEmitting.into());
        }
        Ok(self.stream.take().ok_or(SplitterError::ChunksTaken)?)
    }

    /// Total input length seen so far
    pub fn len(&self) -> u64 {
        self.length + self.residual.len() as u64
    }

    /// Whether no input has been seen
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Root address, once finalized
    pub const fn root(&self) -> Option<SwarmAddress> {
        self.root
    }

    /// Whether the tree has been finalized
    pub const fn is_finalized(&self) -> bool {
        self.root.is_some()
    }

    /// Feed more input.
    pub fn update(&mut self, mut data: &[u8]) -> Result<()> {
        self.ensure_open()?;

        if !self.residual.is_empty() {
            let take = data.len().min(MAX_DATA_LENGTH - self.residual.len());
            self.residual.extend_from_slice(&data[..take]);
            data = &data[take..];

            if self.residual.len() < MAX_DATA_LENGTH {
                return Ok(());
            }
            let leaf = mem::take(&mut self.residual);
            self.write_leaf(&leaf)?;
        }

        let mut leaves = data.chunks_exact(MAX_DATA_LENGTH);
        for leaf in &mut leaves {
            self.write_leaf(leaf)?;
        }
        self.residual.extend_from_slice(leaves.remainder());

        Ok(())
    }

    /// Close the tree and return its root address.
    ///
    /// An empty input yields an empty leaf with span 0 as its root.
    pub fn finalize(&mut self) -> Result<SwarmAddress> {
        self.ensure_open()?;

        if !self.residual.is_empty() || self.length == 0 {
            let leaf = mem::take(&mut self.residual);
            self.write_leaf(&leaf)?;
            let reference = self.sum(0)?;
            self.push(1, reference.as_slice())?;
        }

        let mut root = None;
        for level in 1..LEVELS {
            match self.levels[level].buffer.len() {
                0 => continue,
                SEGMENT_SIZE if self.is_top(level) => {
                    root = Some(SwarmAddress::from_slice(&self.levels[level].buffer)?);
                    break;
                }
                SEGMENT_SIZE => {
                    // Single child, carried up as is
                    let reference = mem::take(&mut self.levels[level].buffer);
                    self.push(level + 1, &reference)?;
                }
                _ => {
                    let reference = self.sum(level)?;
                    self.push(level + 1, reference.as_slice())?;
                }
            }
        }
        let root = root.ok_or(SplitterError::TooLarge)?;

        debug!(length = self.length, %root, "chunk tree finalized");
        self.root = Some(root);
        if let Some(emitter) = self.emitter.take() {
            emitter.finish(root);
        }

        Ok(root)
    }

    /// Feed every buffer of an async stream, then finalize.
    pub async fn consume<S, B>(&mut self, input: S) -> Result<SwarmAddress>
    where
        S: Stream<Item = B>,
        B: AsRef<[u8]>,
    {
        pin_mut!(input);
        while let Some(buf) = input.next().await {
            self.update(buf.as_ref())?;
        }
        self.finalize()
    }

    /// Feed every buffer of an iterator, then finalize.
    pub fn consume_iter<I, B>(&mut self, input: I) -> Result<SwarmAddress>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        for buf in input {
            self.update(buf.as_ref())?;
        }
        self.finalize()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.root.is_some() {
            return Err(SplitterError::AlreadyFinalized.into());
        }
        Ok(())
    }

    /// Whether nothing is pending above `level`
    fn is_top(&self, level: usize) -> bool {
        self.levels[level + 1..]
            .iter()
            .all(|above| above.buffer.is_empty())
    }

    fn write_leaf(&mut self, leaf: &[u8]) -> Result<()> {
        self.length = self
            .length
            .checked_add(leaf.len() as u64)
            .ok_or(SplitterError::TooLarge)?;
        self.push(0, leaf)
    }

    /// Append to a level, closing it into a chunk when full.
    fn push(&mut self, level: usize, data: &[u8]) -> Result<()> {
        let slot = self
            .levels
            .get_mut(level)
            .ok_or(SplitterError::TooLarge)?;
        slot.buffer.extend_from_slice(data);

        if slot.buffer.len() == MAX_DATA_LENGTH {
            let reference = self.sum(level)?;
            self.push(level + 1, reference.as_slice())?;
        }
        Ok(())
    }

    /// Close the content of `level` into a chunk and return its reference.
    fn sum(&mut self, level: usize) -> Result<SwarmAddress> {
        let span = self.span_at(level);
        let slot = &mut self.levels[level];
        let data = mem::replace(&mut slot.buffer, Vec::with_capacity(MAX_DATA_LENGTH));
        let index = slot.count;
        slot.count += 1;

        let chunk = ContentChunk::with_span(span, data)?;
        let reference = *chunk.address();
        trace!(level, index, span, %reference, "closed chunk");

        let delivered = self.emitter.as_ref().map(|emitter| {
            emitter.send(TreeChunk {
                chunk,
                level,
                index,
            })
        });
        if delivered == Some(false) {
            trace!("chunk stream dropped, no longer emitting");
            self.emitter = None;
        }

        Ok(reference)
    }

    /// Payload bytes beneath the chunk being closed at `level`.
    ///
    /// Every earlier chunk at this level is full, so the new one covers what is
    /// left of the total length modulo the capacity of a full chunk there.
    fn span_at(&self, level: usize) -> u64 {
        if self.length == 0 {
            return 0;
        }
        let capacity = (0..level).try_fold(MAX_DATA_LENGTH as u64, |capacity, _| {
            capacity.checked_mul(BRANCHES as u64)
        });
        match capacity {
            Some(capacity) => (self.length - 1) % capacity + 1,
            None => self.length,
        }
    }
}
