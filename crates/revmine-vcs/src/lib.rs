//! # revmine-vcs
//!
//! Version-control access for revmine.
//!
//! This crate hides the backend behind the [`VcsProvider`] trait and walks
//! the commit history page by page through [`RevisionSource`].
//!
//! ## Key Types
//!
//! - [`VcsProvider`] - Backend abstraction (identity, commit pages, diffs)
//! - [`RevisionSource`] - Lazy, paginated iterator over commits
//! - [`Commit`] / [`ChangeEntry`] - Fixed-field commit records
//! - [`TextDecoder`] - Per-line decoding with encoding fallbacks
//! - [`GitProvider`] - git2 backend
//! - [`MemoryProvider`] - In-memory backend for fixtures
//!
//! ## Usage
//!
//! ```rust,ignore
//! use revmine_vcs::{GitProvider, RevisionSource, ScanOptions};
//! use std::path::Path;
//!
//! let provider = GitProvider::open(Path::new("."))?;
//! let options = ScanOptions {
//!     limit: Some(500),
//!     ..Default::default()
//! };
//!
//! for commit in RevisionSource::new(&provider, options) {
//!     let commit = commit?;
//!     println!("r{} {}", commit.revision, commit.summary());
//! }
//! ```

mod decode;
mod git;
mod memory;
mod provider;
mod source;
mod types;

pub use decode::TextDecoder;
pub use git::GitProvider;
pub use memory::MemoryProvider;
pub use provider::{VcsError, VcsProvider};
pub use source::{RevisionSource, ScanOptions, DEFAULT_BATCH_SIZE};
pub use types::{ChangeAction, ChangeEntry, Commit, Revision};
