//! Binary Merkle Tree hasher implementation
//!
//! This module provides an implementation of a BMT hasher that uses Keccak256
//! for computing content-addressed hashes of up to one chunk of data.
//!
//! The hasher treats its 4096-byte buffer as 128 segments of 32 bytes. Unwritten
//! bytes are zero, so a short payload hashes exactly as if it were padded with
//! zeros to a full chunk. The 128 segments are reduced pairwise over seven passes
//! to a single 32-byte root, and the final digest is `keccak256(span || root)`.

use alloy_primitives::{B256, Keccak256};
use std::io::{self, Write};
use std::sync::LazyLock;

use super::constants::*;
use super::error::{BmtError, Result};

/// Pre-computed hashes for zero-filled subtrees at each level.
/// This optimization avoids recomputing hashes for all-zero portions of the buffer.
///
/// - Level 0: hash of 64 zero bytes (one segment pair)
/// - Level 1: hash of two level-0 hashes (128 bytes of zeros)
/// - Level 2: hash of two level-1 hashes (256 bytes of zeros)
/// - Level 3: hash of two level-2 hashes (512 bytes of zeros)
/// - Level 4: hash of two level-3 hashes (1024 bytes of zeros)
/// - Level 5: hash of two level-4 hashes (2048 bytes of zeros)
/// - Level 6: hash of two level-5 hashes (4096 bytes of zeros)
static ZERO_HASHES: LazyLock<[B256; ZERO_TREE_LEVELS]> = LazyLock::new(|| {
    let mut hashes = [B256::ZERO; ZERO_TREE_LEVELS];

    let mut hasher = Keccak256::new();
    hasher.update([0u8; SEGMENT_PAIR_LENGTH]);
    hashes[0] = hasher.finalize();

    for i in 1..ZERO_TREE_LEVELS {
        let mut hasher = Keccak256::new();
        hasher.update(hashes[i - 1]);
        hasher.update(hashes[i - 1]);
        hashes[i] = hasher.finalize();
    }

    hashes
});

/// Single-use BMT hasher over one chunk of data.
///
/// Data is accumulated with [`Hasher::update`] (at most [`MAX_DATA_LENGTH`] bytes in
/// total) and the digest is produced by [`Hasher::finalize`], which consumes the
/// hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    span: [u8; SPAN_SIZE],
    buffer: [u8; MAX_DATA_LENGTH],
    cursor: usize,
}

impl Default for Hasher {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a new BMT hasher with a zero span
    #[inline]
    pub const fn new() -> Self {
        Self {
            span: [0u8; SPAN_SIZE],
            buffer: [0u8; MAX_DATA_LENGTH],
            cursor: 0,
        }
    }

    /// Create a new BMT hasher with the given span
    #[inline]
    pub const fn with_span(span: u64) -> Self {
        let mut hasher = Self::new();
        hasher.span = span.to_le_bytes();
        hasher
    }

    /// Hash `data` under `span` in one call.
    pub fn digest(span: u64, data: &[u8]) -> Result<B256> {
        let mut hasher = Self::with_span(span);
        hasher.update(data)?;
        Ok(hasher.finalize())
    }

    /// Set the span of data to be hashed, encoded little-endian
    #[inline]
    pub const fn set_span(&mut self, span: u64) {
        self.span = span.to_le_bytes();
    }

    /// Set the raw 8-byte span, used verbatim in the final digest
    #[inline]
    pub const fn set_span_bytes(&mut self, span: [u8; SPAN_SIZE]) {
        self.span = span;
    }

    /// Get the current span
    #[inline(always)]
    pub const fn span(&self) -> u64 {
        u64::from_le_bytes(self.span)
    }

    /// Get the raw span bytes
    #[inline(always)]
    pub const fn span_bytes(&self) -> [u8; SPAN_SIZE] {
        self.span
    }

    /// Get the amount of data currently in the buffer
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.cursor
    }

    /// Check if the buffer is empty
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Get the data written so far
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.buffer[..self.cursor]
    }

    /// Append data to the chunk buffer.
    ///
    /// Fails without modifying the hasher if the total would exceed
    /// [`MAX_DATA_LENGTH`].
    #[inline]
    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        let end = self.cursor + data.len();
        if end > MAX_DATA_LENGTH {
            return Err(BmtError::invalid_input_size(end, MAX_DATA_LENGTH));
        }

        self.buffer[self.cursor..end].copy_from_slice(data);
        self.cursor = end;
        Ok(())
    }

    /// Compute the BMT digest, consuming the hasher
    #[inline]
    #[must_use]
    pub fn finalize(self) -> B256 {
        let root = self.hash_internal();

        let mut hasher = Keccak256::new();
        hasher.update(self.span);
        hasher.update(root);
        hasher.finalize()
    }

    /// Compute the 32-byte root of the segment tree.
    ///
    /// 1. Finds the smallest power-of-2 subtree containing all data
    /// 2. Hashes only that subtree
    /// 3. Combines with pre-computed zero hashes to reach the root
    #[inline(always)]
    fn hash_internal(&self) -> B256 {
        if self.cursor == 0 {
            return ZERO_HASHES[ZERO_TREE_LEVELS - 1];
        }

        // Minimum is one segment pair (64 bytes), maximum is the full chunk
        let effective_size = self
            .cursor
            .next_power_of_two()
            .clamp(SEGMENT_PAIR_LENGTH, MAX_DATA_LENGTH);

        let mut result = self.hash_subtree(&self.buffer[..effective_size]);

        let mut current_size = effective_size;
        while current_size < MAX_DATA_LENGTH {
            // The current result is a left child, its right sibling is all zeros
            let mut hasher = Keccak256::new();
            hasher.update(result);
            hasher.update(ZERO_HASHES[Self::zero_tree_level(current_size)]);
            result = hasher.finalize();
            current_size *= 2;
        }

        result
    }

    /// Hash a subtree of a power-of-2 length of at least 64 bytes
    fn hash_subtree(&self, data: &[u8]) -> B256 {
        let length = data.len();
        debug_assert!(length.is_power_of_two());
        debug_assert!(length >= SEGMENT_PAIR_LENGTH);

        if length == SEGMENT_PAIR_LENGTH {
            let mut hasher = Keccak256::new();
            hasher.update(data);
            return hasher.finalize();
        }

        let half = length / 2;
        let (left, right) = data.split_at(half);

        // `data` always starts at offset 0 of the buffer, so the right half is
        // beyond the cursor exactly when `half >= cursor`
        let (left_hash, right_hash) = if half >= self.cursor {
            (
                self.hash_subtree(left),
                ZERO_HASHES[Self::zero_tree_level(half)],
            )
        } else {
            rayon::join(
                || self.hash_subtree(left),
                || self.hash_right_subtree(right, half),
            )
        };

        let mut hasher = Keccak256::new();
        hasher.update(left_hash);
        hasher.update(right_hash);
        hasher.finalize()
    }

    /// Hash a right-hand subtree starting at `offset` within the buffer
    fn hash_right_subtree(&self, data: &[u8], offset: usize) -> B256 {
        let length = data.len();
        if length == SEGMENT_PAIR_LENGTH {
            let mut hasher = Keccak256::new();
            hasher.update(data);
            return hasher.finalize();
        }

        let half = length / 2;
        let (left, right) = data.split_at(half);

        let (left_hash, right_hash) = if offset + half >= self.cursor {
            (
                self.hash_right_subtree(left, offset),
                ZERO_HASHES[Self::zero_tree_level(half)],
            )
        } else {
            rayon::join(
                || self.hash_right_subtree(left, offset),
                || self.hash_right_subtree(right, offset + half),
            )
        };

        let mut hasher = Keccak256::new();
        hasher.update(left_hash);
        hasher.update(right_hash);
        hasher.finalize()
    }

    /// Zero-tree level for a subtree length: a power of 2 between 64 and 4096.
    #[inline(always)]
    const fn zero_tree_level(length: usize) -> usize {
        // length = 64 * 2^level
        length.trailing_zeros() as usize - 6
    }
}

impl Write for Hasher {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        Ok(buf.len())
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
