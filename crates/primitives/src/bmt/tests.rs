//! Tests for the Binary Merkle Tree implementation.

use super::*;
use alloy_primitives::{B256, b256, keccak256};
use std::io::Write;

/// Straightforward reduction of a zero-padded chunk, used as a reference.
fn naive_bmt(span: u64, data: &[u8]) -> B256 {
    let mut buffer = vec![0u8; MAX_DATA_LENGTH];
    buffer[..data.len()].copy_from_slice(data);

    let mut level: Vec<B256> = buffer
        .chunks_exact(SEGMENT_SIZE)
        .map(B256::from_slice)
        .collect();
    while level.len() > 1 {
        level = level
            .chunks_exact(2)
            .map(|pair| keccak256([pair[0].as_slice(), pair[1].as_slice()].concat()))
            .collect();
    }

    keccak256([span.to_le_bytes().as_slice(), level[0].as_slice()].concat())
}

fn incrementing(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 255) as u8).collect()
}

#[test]
fn test_concurrent_simple() {
    let data: [u8; 3] = [1, 2, 3];

    let mut hasher = Hasher::new();
    hasher.set_span(data.len() as u64);
    hasher.update(&data).unwrap();
    let result = hasher.finalize();

    assert_eq!(
        result,
        b256!("ca6357a08e317d15ec560fef34e4c45f8f19f01c372aa70f1da72bfa7f1a4338")
    );
}

#[test]
fn test_known_short_payload() {
    let data = incrementing(31);
    let result = Hasher::digest(31, &data).unwrap();

    assert_eq!(
        result,
        b256!("ece86edb20669cc60d142789d464d57bdf5e33cb789d443f608cbd81cfa5697d")
    );
}

#[test]
fn test_known_full_payload() {
    let data = incrementing(MAX_DATA_LENGTH);
    let result = Hasher::digest(MAX_DATA_LENGTH as u64, &data).unwrap();

    assert_eq!(
        result,
        b256!("c10090961e7682a10890c334d759a28426647141213abda93b096b892824d2ef")
    );
}

#[test]
fn test_matches_naive_reduction() {
    for len in [0, 1, 31, 32, 33, 63, 64, 65, 100, 127, 128, 129, 1000, 2048, 2049, 4095, 4096] {
        let data: Vec<u8> = (0..len).map(|_| rand::random::<u8>()).collect();
        let result = Hasher::digest(len as u64, &data).unwrap();
        assert_eq!(result, naive_bmt(len as u64, &data), "length {len}");
    }
}

#[test]
fn test_zero_padding_is_implicit() {
    let data = incrementing(100);
    let mut padded = data.clone();
    padded.resize(MAX_DATA_LENGTH, 0);

    // Trailing zeros do not change the digest for the same span
    assert_eq!(
        Hasher::digest(100, &data).unwrap(),
        Hasher::digest(100, &padded).unwrap()
    );
}

#[test]
fn test_span_changes_digest() {
    let data = incrementing(64);
    assert_ne!(
        Hasher::digest(64, &data).unwrap(),
        Hasher::digest(8192, &data).unwrap()
    );
}

#[test]
fn test_span_bytes_used_verbatim() {
    let data = incrementing(64);

    let mut hasher = Hasher::new();
    hasher.set_span_bytes(4096u64.to_le_bytes());
    hasher.update(&data).unwrap();
    assert_eq!(hasher.span(), 4096);

    assert_eq!(hasher.finalize(), Hasher::digest(4096, &data).unwrap());
}

#[test]
fn test_incremental_updates() {
    let data = incrementing(3000);

    let mut hasher = Hasher::with_span(3000);
    for piece in data.chunks(7) {
        hasher.update(piece).unwrap();
    }
    assert_eq!(hasher.len(), 3000);
    assert_eq!(hasher.data(), data.as_slice());

    assert_eq!(hasher.finalize(), Hasher::digest(3000, &data).unwrap());
}

#[test]
fn test_hasher_empty_data() {
    let hasher = Hasher::new();
    assert!(hasher.is_empty());

    let result = hasher.finalize();
    assert_eq!(result, naive_bmt(0, &[]));
}

#[test]
fn test_overflow_is_rejected() {
    let mut hasher = Hasher::new();
    hasher.update(&[0x42; 4000]).unwrap();

    let err = hasher.update(&[0x42; 97]).unwrap_err();
    assert_eq!(
        err,
        BmtError::InvalidInputSize {
            attempted: 4097,
            capacity: MAX_DATA_LENGTH
        }
    );

    // A rejected write leaves the buffer untouched
    assert_eq!(hasher.len(), 4000);
    hasher.update(&[0x42; 96]).unwrap();
    assert_eq!(hasher.len(), MAX_DATA_LENGTH);
}

#[test]
fn test_write_trait() {
    let data = incrementing(500);

    let mut hasher = Hasher::with_span(500);
    hasher.write_all(&data).unwrap();
    hasher.flush().unwrap();
    assert_eq!(hasher.finalize(), Hasher::digest(500, &data).unwrap());

    let mut hasher = Hasher::new();
    let err = hasher.write_all(&[0u8; MAX_DATA_LENGTH + 1]).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
}

#[test]
fn test_clone_is_independent() {
    let mut hasher = Hasher::with_span(10);
    hasher.update(b"hello").unwrap();

    let mut fork = hasher.clone();
    fork.update(b"world").unwrap();

    assert_eq!(hasher.finalize(), Hasher::digest(10, b"hello").unwrap());
    assert_eq!(fork.finalize(), Hasher::digest(10, b"helloworld").unwrap());
}
