//! Feeds and data lists for Swarm-style storage
//!
//! A feed is a sequence of updates published by a single owner under a topic.
//! Update `i` is a single-owner chunk whose identifier is derived from the
//! topic and `i` ([`IndexedTopic`]), so anyone knowing the owner and topic can
//! compute where each update lives ([`FeedReader`]). Only the owner can sign
//! updates ([`FeedWriter`]).
//!
//! Data lists ([`DataListWriter`], [`DataListReader`]) publish typed, JSON
//! encoded values of any size through a feed: each value is uploaded as a chunk
//! tree and the feed update points at its root.
//!
//! ```
//! use alloy_signer_local::PrivateKeySigner;
//! use comb_client::{ChunkClient, MemoryStore};
//! use comb_primitives::Chunk;
//! use comb_feeds::{FeedWriter, IndexedTopic};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let client = ChunkClient::new(MemoryStore::new());
//! let mut writer = FeedWriter::new(client, PrivateKeySigner::random(), IndexedTopic::default());
//!
//! writer.write(b"first".as_slice()).await?;
//! writer.write(b"second".as_slice()).await?;
//!
//! let reader = writer.reader();
//! assert_eq!(reader.chunk_at(1).await?.data().as_ref(), b"second");
//! assert!(reader.chunk_at(2).await.unwrap_err().is_not_found());
//! # Ok::<(), comb_feeds::FeedError>(())
//! # }).unwrap();
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod data_list;
mod error;
mod reader;
mod topic;
mod writer;

pub use data_list::{DataListCursor, DataListReader, DataListWriter};
pub use error::{FeedError, Result};
pub use reader::{FeedCursor, FeedReader};
pub use topic::{DEFAULT_TOPIC, IndexedTopic};
pub use writer::FeedWriter;
