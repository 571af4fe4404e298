//! Chunk transport for Swarm-style storage
//!
//! Stores are abstracted behind two async capabilities, [`ChunkSource`] and
//! [`ChunkSink`]. [`ChunkClient`] moves single chunks and whole chunk trees
//! through them: trees are built and uploaded while the input streams in, and
//! downloaded depth-first with every chunk checked against its address.
//!
//! ```
//! use comb_client::{ChunkClient, MemoryStore};
//! use std::time::Duration;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let client = ChunkClient::new(MemoryStore::new()).with_timeout(Duration::from_secs(5));
//!
//! let root = client.upload_file(b"hello world").await?;
//! assert_eq!(client.download_file(&root).await?.as_ref(), b"hello world");
//! # Ok::<(), comb_client::ClientError>(())
//! # }).unwrap();
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod client;
mod error;
mod store;

pub use client::{ChunkClient, DEFAULT_UPLOAD_CONCURRENCY};
pub use error::{ClientError, Result, StoreError};
pub use store::{ChunkSink, ChunkSource, MemoryStore};
