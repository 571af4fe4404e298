use thiserror::Error;

/// Misuse of the chunk tree builder, or loss of its producer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitterError {
    /// `update` or `finalize` was called after the tree was finalized
    #[error("chunk tree already finalized")]
    AlreadyFinalized,

    /// Chunks were requested from a splitter created without emission
    #[error("splitter was not created to emit chunks")]
    NotEmitting,

    /// The chunk stream was already handed out
    #[error("chunk stream already taken")]
    ChunksTaken,

    /// The splitter was dropped before producing a root
    #[error("splitter dropped before the tree was finalized")]
    Abandoned,

    /// The input no longer fits the tree
    #[error("input too large for a chunk tree")]
    TooLarge,
}
