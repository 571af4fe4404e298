//! Basic usage example for the primitives crate

use alloy_primitives::B256;
use alloy_signer_local::PrivateKeySigner;
use comb_primitives::{BmtChunk, Chunk, ContentChunk, FileSplitter, SingleOwnerChunk, error::Result};

fn main() -> Result<()> {
    // A single leaf chunk, addressed by the BMT hash of its span and data
    let chunk = ContentChunk::new(vec![0u8; 1016])?;
    println!("Leaf chunk {} with span {}", chunk.address(), chunk.span());

    // Round trip through the wire form and verify the address
    let parsed = ContentChunk::try_from(chunk.to_bytes())?;
    parsed.verify(chunk.address())?;
    println!("Chunk integrity verified successfully");

    // Larger input is split into a tree of chunks
    let data: Vec<u8> = (0..20_000u32).map(|i| (i % 255) as u8).collect();
    let mut splitter = FileSplitter::emitting();
    let chunks = splitter.take_chunks()?;
    splitter.update(&data)?;
    let root = splitter.finalize()?;
    drop(splitter);

    let emitted = futures::executor::block_on(futures::StreamExt::collect::<Vec<_>>(chunks));
    println!("Tree root {} built from {} chunks", root.to_hex(), emitted.len());

    // Wrap the root reference in a chunk signed by its owner
    let owner = PrivateKeySigner::random();
    let soc = SingleOwnerChunk::new(B256::ZERO, root.to_vec(), &owner)?;
    let verified = SingleOwnerChunk::validate(soc.to_bytes(), &owner.address())?;
    println!(
        "Single-owner chunk {} signed by {}",
        verified.address(),
        verified.owner()
    );

    Ok(())
}
