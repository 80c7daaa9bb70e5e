//! # revmine-store
//!
//! Durable output for revmine.
//!
//! Extracted records are grouped into chunk files named after the inclusive
//! revision range they cover (`{low}-{high}.{ext}`). The set of chunk files
//! doubles as the cache: a revision inside any chunk's range has already been
//! extracted and is skipped on the next run.
//!
//! ## Key Types
//!
//! - [`CacheRange`] - Inclusive revision range of one chunk
//! - [`CacheIndex`] - Ranges already persisted in an output directory
//! - [`OutputChunk`] - Records accumulated since the last flush
//! - [`OutputBatcher`] - Accumulates records and flushes chunks atomically
//!
//! ## Flushing
//!
//! A chunk is first written to a temporary file in the output directory and
//! then renamed onto its final name, so a chunk path is either absent or
//! complete. Leftover temporary files never match the chunk naming scheme and
//! are ignored when the index is rebuilt.

mod batcher;
mod index;
mod range;

pub use batcher::{OutputBatcher, OutputChunk, StoreError, DEFAULT_CHUNK_EXTENSION};
pub use index::CacheIndex;
pub use range::CacheRange;
