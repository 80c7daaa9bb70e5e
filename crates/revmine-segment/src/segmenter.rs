use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::line::DiffLine;

/// Default number of unchanged lines that separates two blocks
pub const DEFAULT_CONTEXT_GAP: usize = 5;

/// Default number of file-identifier lines preceding the first hunk
pub const DEFAULT_HEADER_LINES: usize = 4;

const HUNK_HEADER_PREFIX: &str = "@@";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SegmentError {
    #[error("Context gap must be at least 1")]
    InvalidContextGap,

    #[error("Change on line {line} appears before any hunk header")]
    MissingHunkHeader { line: usize },
}

/// A paired before/after snippet extracted from a diff
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffBlock {
    /// Context and removed lines, trimmed
    pub original: String,
    /// Context and added lines, trimmed
    pub modified: String,
}

impl DiffBlock {
    fn from_lines(raw_lines: &[&str]) -> Self {
        let mut original = Vec::new();
        let mut modified = Vec::new();

        for raw in raw_lines {
            let line = DiffLine::parse(raw);
            if line.in_original() {
                original.push(line.text);
            }
            if line.in_modified() {
                modified.push(line.text);
            }
        }

        Self {
            original: original.join("\n").trim().to_string(),
            modified: modified.join("\n").trim().to_string(),
        }
    }

    /// True when both sides are empty
    pub fn is_blank(&self) -> bool {
        self.original.is_empty() && self.modified.is_empty()
    }
}

/// Splits a unified diff into [`DiffBlock`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segmenter {
    context_gap: usize,
    header_lines: usize,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self {
            context_gap: DEFAULT_CONTEXT_GAP,
            header_lines: DEFAULT_HEADER_LINES,
        }
    }
}

impl Segmenter {
    pub fn new(context_gap: usize) -> Result<Self, SegmentError> {
        if context_gap == 0 {
            return Err(SegmentError::InvalidContextGap);
        }
        Ok(Self {
            context_gap,
            ..Default::default()
        })
    }

    /// Override how many leading metadata lines are skipped
    pub fn with_header_lines(mut self, header_lines: usize) -> Self {
        self.header_lines = header_lines;
        self
    }

    pub fn context_gap(&self) -> usize {
        self.context_gap
    }

    pub fn header_lines(&self) -> usize {
        self.header_lines
    }

    /// Segment one file's diff.
    ///
    /// Blocks are returned in file order and never share a line. A block
    /// never starts before the first content line of its hunk, and a new
    /// hunk header closes any block still open.
    ///
    /// A block still open at end of input runs through the last line. Input
    /// is split with `str::lines`, which yields no empty fragment after a
    /// trailing newline, so this is the same as closing before that final
    /// empty fragment.
    pub fn segment(&self, diff: &str) -> Result<Vec<DiffBlock>, SegmentError> {
        let lines: Vec<&str> = diff.lines().collect();
        let mut blocks = Vec::new();

        // First content line of the current hunk
        let mut hunk_start: Option<usize> = None;
        // End of the last emitted block
        let mut last_end = 0;
        let mut open: Option<usize> = None;
        let mut unchanged = 0;

        for (idx, raw) in lines.iter().enumerate().skip(self.header_lines) {
            if raw.starts_with(HUNK_HEADER_PREFIX) {
                if let Some(start) = open.take() {
                    Self::push_block(&mut blocks, &lines[start..idx]);
                    last_end = idx;
                }
                hunk_start = Some(idx + 1);
                continue;
            }

            let line = DiffLine::parse(raw);
            if line.is_change() {
                let Some(earliest) = hunk_start else {
                    return Err(SegmentError::MissingHunkHeader { line: idx + 1 });
                };
                unchanged = 0;
                if open.is_none() {
                    let start = idx
                        .saturating_sub(self.context_gap)
                        .max(earliest)
                        .max(last_end);
                    trace!(line = idx + 1, start = start + 1, "Opening block");
                    open = Some(start);
                }
            } else if let Some(start) = open {
                unchanged += 1;
                if unchanged >= self.context_gap {
                    Self::push_block(&mut blocks, &lines[start..idx]);
                    open = None;
                    last_end = idx;
                }
            }
        }

        if let Some(start) = open {
            Self::push_block(&mut blocks, &lines[start..]);
        }

        debug!(
            lines = lines.len(),
            blocks = blocks.len(),
            context_gap = self.context_gap,
            "Segmented diff"
        );

        Ok(blocks)
    }

    fn push_block(blocks: &mut Vec<DiffBlock>, raw_lines: &[&str]) {
        let block = DiffBlock::from_lines(raw_lines);
        if !block.is_blank() {
            blocks.push(block);
        }
    }
}

/// Segment `diff` with the default header size and the given context gap
pub fn segment(diff: &str, context_gap: usize) -> Result<Vec<DiffBlock>, SegmentError> {
    Segmenter::new(context_gap)?.segment(diff)
}
