//! Constants used in the Binary Merkle Tree implementation

/// Hash size in bytes (keccak256)
pub const HASH_SIZE: usize = 32;

/// Size of a segment in the BMT (same as hash size)
pub const SEGMENT_SIZE: usize = HASH_SIZE;

/// Length of a segment pair (two segments)
pub(crate) const SEGMENT_PAIR_LENGTH: usize = 2 * SEGMENT_SIZE;

/// Number of branches in the Binary Merkle Tree
pub const BRANCHES: usize = 128;

/// Maximum payload of a single chunk (128 branches * 32 byte segments = 4096)
pub const MAX_DATA_LENGTH: usize = BRANCHES * SEGMENT_SIZE;

/// Size of the little-endian span prefix
pub const SPAN_SIZE: usize = std::mem::size_of::<u64>();

/// Number of pairwise reduction passes from 128 segments down to the root (log2(128))
pub(crate) const ZERO_TREE_LEVELS: usize = 7;
