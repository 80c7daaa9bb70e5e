//! # revmine-segment
//!
//! Turns the unified diff of a single file into paired "before" and
//! "after" text blocks.
//!
//! ## Overview
//!
//! A diff is read line by line. Every run of added/removed lines opens a
//! block that carries up to `context_gap` lines of leading context. The
//! block stays open until `context_gap` unchanged lines in a row have been
//! seen, so nearby edits end up in the same block:
//!
//! - change runs separated by fewer than `context_gap` unchanged lines merge
//! - change runs separated by `context_gap` or more unchanged lines split
//!
//! ## Key Types
//!
//! - [`Segmenter`] - Configured segmentation entry point
//! - [`DiffBlock`] - One (original, modified) pair
//! - [`DiffLine`] - A classified line of diff text
//! - [`DiffStat`] - Added/removed line counts of a diff
//!
//! ## Usage
//!
//! ```rust
//! use revmine_segment::Segmenter;
//!
//! let diff = "Index: a.lua\n===\n--- a.lua\n+++ a.lua\n@@ -1,2 +1,2 @@\n-a\n+b\n";
//! let blocks = Segmenter::default().segment(diff).unwrap();
//!
//! assert_eq!(blocks.len(), 1);
//! assert_eq!(blocks[0].original, "a");
//! assert_eq!(blocks[0].modified, "b");
//! ```

mod line;
mod segmenter;
mod stat;

pub use line::{DiffLine, LineMarker};
pub use segmenter::{
    segment, DiffBlock, SegmentError, Segmenter, DEFAULT_CONTEXT_GAP, DEFAULT_HEADER_LINES,
};
pub use stat::DiffStat;
