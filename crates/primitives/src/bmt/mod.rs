//! Binary Merkle Tree (BMT) implementation for content addressing.
//!
//! This module provides an optimized implementation of a Binary Merkle Tree
//! for hashing up to one chunk of data, hashing disjoint subtrees in parallel.

pub mod constants;
pub mod error;
pub mod hasher;

pub use constants::*;
pub use error::{BmtError, Result};
pub use hasher::Hasher;

#[cfg(test)]
mod tests;
