//! Tests for the chunk tree builder.

use super::*;
use crate::PrimitivesError;
use alloy_primitives::{B256, b256};
use futures::executor::block_on;
use futures::stream::{self, FusedStream};

const CHUNK: usize = MAX_DATA_LENGTH;

/// Repeating `i % 255` pattern, starting at absolute offset `offset`.
fn pattern(offset: usize, len: usize) -> Vec<u8> {
    (offset..offset + len).map(|i| (i % 255) as u8).collect()
}

/// Root of `len` pattern bytes, fed in pieces to keep memory flat.
fn pattern_root(len: usize) -> SwarmAddress {
    const PIECE: usize = 1 << 20;

    let mut splitter = FileSplitter::new();
    let mut offset = 0;
    while offset < len {
        let piece = PIECE.min(len - offset);
        splitter.update(&pattern(offset, piece)).unwrap();
        offset += piece;
    }
    splitter.finalize().unwrap()
}

fn collect_chunks(data: &[u8]) -> (SwarmAddress, Vec<TreeChunk>) {
    let mut splitter = FileSplitter::emitting();
    let chunks = splitter.take_chunks().unwrap();
    splitter.update(data).unwrap();
    let root = splitter.finalize().unwrap();
    drop(splitter);

    (root, block_on(chunks.collect::<Vec<_>>()))
}

fn assert_root(len: usize, expected: B256) {
    assert_eq!(*pattern_root(len), expected, "length {len}");
}

#[test]
fn test_known_roots_single_chunk() {
    assert_root(
        31,
        b256!("ece86edb20669cc60d142789d464d57bdf5e33cb789d443f608cbd81cfa5697d"),
    );
    assert_root(
        32,
        b256!("0be77f0bb7abc9cd0abed640ee29849a3072ccfd1020019fe03658c38f087e02"),
    );
    assert_root(
        33,
        b256!("3463b46d4f9d5bfcbf9a23224d635e51896c1daef7d225b86679db17c5fd868e"),
    );
    assert_root(
        63,
        b256!("95510c2ff18276ed94be2160aed4e69c9116573b6f69faaeed1b426fea6a3db8"),
    );
    assert_root(
        64,
        b256!("490072cc55b8ad381335ff882ac51303cc069cbcb8d8d3f7aa152d9c617829fe"),
    );
    assert_root(
        65,
        b256!("541552bae05e9a63a6cb561f69edf36ffe073e441667dbf7a0e9a3864bb744ea"),
    );
    assert_root(
        CHUNK,
        b256!("c10090961e7682a10890c334d759a28426647141213abda93b096b892824d2ef"),
    );
}

#[test]
fn test_known_roots_two_levels() {
    assert_root(
        CHUNK + 31,
        b256!("91699c83ed93a1f87e326a29ccd8cc775323f9e7260035a5f014c975c5f3cd28"),
    );
    assert_root(
        CHUNK + 32,
        b256!("73759673a52c1f1707cbb61337645f4fcbd209cdc53d7e2cedaaa9f44df61285"),
    );
    assert_root(
        CHUNK + 63,
        b256!("db1313a727ffc184ae52a70012fbbf7235f551b9f2d2da04bf476abe42a3cb42"),
    );
    assert_root(
        CHUNK + 64,
        b256!("ade7af36ac0c7297dc1c11fd7b46981b629c6077bce75300f85b02a6153f161b"),
    );
    assert_root(
        CHUNK * 2,
        b256!("29a5fb121ce96194ba8b7b823a1f9c6af87e1791f824940a53b5a7efe3f790d9"),
    );
    assert_root(
        CHUNK * 2 + 32,
        b256!("61416726988f77b874435bdd89a419edc3861111884fd60e8adf54e2f299efd6"),
    );
    assert_root(
        CHUNK * 128,
        b256!("3047d841077898c26bbe6be652a2ec590a5d9bd7cd45d290ea42511b48753c09"),
    );
}

#[test]
fn test_known_roots_three_levels() {
    assert_root(
        CHUNK * 128 + 31,
        b256!("e5c76afa931e33ac94bce2e754b1bb6407d07f738f67856783d93934ca8fc576"),
    );
    assert_root(
        CHUNK * 128 + 32,
        b256!("485a526fc74c8a344c43a4545a5987d17af9ab401c0ef1ef63aefcc5c2c086df"),
    );
    assert_root(
        CHUNK * 128 + 64,
        b256!("624b2abb7aefc0978f891b2a56b665513480e5dc195b4a66cd8def074a6d2e94"),
    );
    assert_root(
        CHUNK * 129,
        b256!("b8e1804e37a064d28d161ab5f256cc482b1423d5cd0a6b30fde7b0f51ece9199"),
    );
    assert_root(
        CHUNK * 130,
        b256!("59de730bf6c67a941f3b2ffa2f920acfaa1713695ad5deea12b4a121e5f23fa1"),
    );
}

#[test]
fn test_known_roots_four_levels() {
    assert_root(
        CHUNK * 128 * 128,
        b256!("522194562123473dcfd7a457b18ee7dee8b7db70ed3cfa2b73f348a992fdfd3b"),
    );
    assert_root(
        CHUNK * 128 * 128 + 32,
        b256!("ed0cc44c93b14fef2d91ab3a3674eeb6352a42ac2f0bbe524711824aae1e7bcc"),
    );
}

#[test]
fn test_update_boundaries_do_not_matter() {
    let data = pattern(0, CHUNK * 3 + 100);
    let expected = FileSplitter::hash(&data).unwrap();

    for piece in [1, 31, 4095, 4096, 4097, 10_000] {
        let mut splitter = FileSplitter::new();
        let root = splitter.consume_iter(data.chunks(piece)).unwrap();
        assert_eq!(root, expected, "piece size {piece}");
    }

    // Topping up a residual to exactly one leaf
    let mut splitter = FileSplitter::new();
    splitter.update(&data[..100]).unwrap();
    splitter.update(&data[100..CHUNK]).unwrap();
    splitter.update(&data[CHUNK..]).unwrap();
    assert_eq!(splitter.len(), data.len() as u64);
    assert_eq!(splitter.finalize().unwrap(), expected);
}

#[test]
fn test_single_leaf_root_is_bmt() {
    let data = pattern(0, 1000);
    let root = FileSplitter::hash(&data).unwrap();

    let leaf = FileSplitter::single_chunk(data).unwrap();
    assert_eq!(*leaf.address(), root);
    assert_eq!(leaf.span(), 1000);
    assert_eq!((leaf.level(), leaf.index()), (0, 0));
}

#[test]
fn test_single_chunk_too_large() {
    assert!(matches!(
        FileSplitter::single_chunk(vec![0u8; CHUNK + 1]),
        Err(PrimitivesError::Chunk(_))
    ));
}

#[test]
fn test_empty_input() {
    let (root, chunks) = collect_chunks(&[]);

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].span(), 0);
    assert!(chunks[0].chunk().data().is_empty());
    assert_eq!(*chunks[0].address(), root);
    assert_eq!(root, *ContentChunk::new(Bytes::new()).unwrap().address());
}

#[test]
fn test_two_leaf_structure() {
    let (root, chunks) = collect_chunks(&pattern(0, CHUNK + 1));

    let summary: Vec<_> = chunks
        .iter()
        .map(|c| (c.level(), c.index(), c.span()))
        .collect();
    assert_eq!(summary, vec![(0, 0, 4096), (0, 1, 1), (1, 0, 4097)]);

    let top = chunks.last().unwrap();
    assert_eq!(*top.address(), root);
    let mut expected_refs = chunks[0].address().to_vec();
    expected_refs.extend_from_slice(chunks[1].address().as_slice());
    assert_eq!(top.chunk().data().as_ref(), expected_refs.as_slice());
}

#[test]
fn test_full_level_structure() {
    let (root, chunks) = collect_chunks(&pattern(0, CHUNK * 128));

    assert_eq!(chunks.len(), 129);
    let intermediates: Vec<_> = chunks.iter().filter(|c| c.level() > 0).collect();
    assert_eq!(intermediates.len(), 1);
    assert_eq!(intermediates[0].span(), (CHUNK * 128) as u64);
    assert_eq!(intermediates[0].chunk().data().len(), CHUNK);
    assert_eq!(*intermediates[0].address(), root);
}

#[test]
fn test_promoted_leaf_structure() {
    for len in [CHUNK * 128 + 1, CHUNK * 129] {
        let (root, chunks) = collect_chunks(&pattern(0, len));

        let intermediates: Vec<_> = chunks
            .iter()
            .filter(|c| c.level() > 0)
            .map(|c| (c.level(), c.index(), c.span(), c.chunk().data().len()))
            .collect();

        // The trailing leaf is carried up to level 2 without a wrapper
        assert_eq!(
            intermediates,
            vec![
                (1, 0, (CHUNK * 128) as u64, CHUNK),
                (2, 0, len as u64, 64),
            ],
            "length {len}"
        );
        assert_eq!(*chunks.last().unwrap().address(), root);
    }
}

#[test]
fn test_partial_second_branch_structure() {
    let (_, chunks) = collect_chunks(&pattern(0, CHUNK * 130));

    let intermediates: Vec<_> = chunks
        .iter()
        .filter(|c| c.level() > 0)
        .map(|c| (c.level(), c.index(), c.span()))
        .collect();
    assert_eq!(
        intermediates,
        vec![
            (1, 0, (CHUNK * 128) as u64),
            (1, 1, (CHUNK * 2) as u64),
            (2, 0, (CHUNK * 130) as u64),
        ]
    );
}

#[test]
fn test_intermediate_chunks_have_several_children() {
    for len in [CHUNK + 1, CHUNK * 128 + 1, CHUNK * 129 + 7, CHUNK * 256] {
        let (_, chunks) = collect_chunks(&pattern(0, len));
        for chunk in chunks.iter().filter(|c| c.level() > 0) {
            assert!(chunk.chunk().data().len() >= 64, "length {len}");
            assert!(chunk.span() > CHUNK as u64, "length {len}");
        }
    }
}

#[test]
fn test_leaves_in_order() {
    let data = pattern(0, CHUNK * 5 + 17);
    let (_, chunks) = collect_chunks(&data);

    let joined: Vec<u8> = chunks
        .iter()
        .filter(|c| c.level() == 0)
        .flat_map(|c| c.chunk().data().to_vec())
        .collect();
    assert_eq!(joined, data);

    let indices: Vec<_> = chunks
        .iter()
        .filter(|c| c.level() == 0)
        .map(TreeChunk::index)
        .collect();
    assert_eq!(indices, (0..6).collect::<Vec<_>>());
}

#[test]
fn test_contract_violations() {
    let mut splitter = FileSplitter::new();
    assert!(matches!(
        splitter.take_chunks(),
        Err(PrimitivesError::Splitter(SplitterError::NotEmitting))
    ));

    splitter.update(b"data").unwrap();
    let root = splitter.finalize().unwrap();
    assert_eq!(splitter.root(), Some(root));
    assert!(splitter.is_finalized());

    assert!(matches!(
        splitter.finalize(),
        Err(PrimitivesError::Splitter(SplitterError::AlreadyFinalized))
    ));
    assert!(matches!(
        splitter.update(b"more"),
        Err(PrimitivesError::Splitter(SplitterError::AlreadyFinalized))
    ));

    let mut emitting = FileSplitter::emitting();
    let _chunks = emitting.take_chunks().unwrap();
    assert!(matches!(
        emitting.take_chunks(),
        Err(PrimitivesError::Splitter(SplitterError::ChunksTaken))
    ));
}

#[tokio::test]
async fn test_stream_and_root() {
    let mut splitter = FileSplitter::emitting();
    let mut chunks = splitter.take_chunks().unwrap();

    splitter.update(&pattern(0, CHUNK * 2)).unwrap();
    let first = chunks.next().await.unwrap();
    assert_eq!((first.level(), first.index()), (0, 0));

    let root = splitter.finalize().unwrap();
    drop(splitter);

    let rest: Vec<_> = (&mut chunks).collect().await;
    assert_eq!(rest.len(), 2);
    assert_eq!(*rest[1].address(), root);
    assert!(chunks.is_terminated());
    assert_eq!(chunks.root().await.unwrap(), root);
}

#[tokio::test]
async fn test_stream_taken_after_finalize() {
    let mut splitter = FileSplitter::emitting();
    let root = splitter
        .consume(stream::iter(vec![pattern(0, 5000), pattern(5000, 5000)]))
        .await
        .unwrap();

    let chunks = splitter.take_chunks().unwrap();
    let emitted: Vec<_> = chunks.collect().await;
    assert_eq!(emitted.len(), 4);
    assert_eq!(*emitted.last().unwrap().address(), root);
}

#[tokio::test]
async fn test_abandoned_splitter() {
    let mut splitter = FileSplitter::emitting();
    let chunks = splitter.take_chunks().unwrap();
    splitter.update(&pattern(0, CHUNK + 1)).unwrap();
    drop(splitter);

    assert_eq!(chunks.root().await, Err(SplitterError::Abandoned));
}

#[test]
fn test_dropped_stream_keeps_hashing() {
    let data = pattern(0, CHUNK * 3);

    let mut splitter = FileSplitter::emitting();
    drop(splitter.take_chunks().unwrap());
    splitter.update(&data).unwrap();

    assert_eq!(
        splitter.finalize().unwrap(),
        FileSplitter::hash(&data).unwrap()
    );
}
