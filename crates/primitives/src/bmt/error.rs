use thiserror::Error;

/// Result type for BMT operations
pub type Result<T> = std::result::Result<T, BmtError>;

/// Errors specific to BMT operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BmtError {
    /// More data was written than a single chunk can hold
    #[error("input exceeds chunk capacity: {attempted} bytes written, capacity {capacity}")]
    InvalidInputSize {
        /// Total number of bytes the write would have accumulated
        attempted: usize,
        /// Maximum number of bytes a hasher accepts
        capacity: usize,
    },
}

impl BmtError {
    /// Create an error for a write that would overflow the chunk buffer.
    pub const fn invalid_input_size(attempted: usize, capacity: usize) -> Self {
        Self::InvalidInputSize {
            attempted,
            capacity,
        }
    }
}
