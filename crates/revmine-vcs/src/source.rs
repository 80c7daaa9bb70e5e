use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::provider::{VcsError, VcsProvider};
use crate::types::{Commit, Revision};

/// Default number of commits requested per backend call
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Parameters of a history scan
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Lowest revision to yield (inclusive)
    pub start: Option<Revision>,
    /// Maximum number of commits to yield (None = unlimited)
    pub limit: Option<usize>,
    /// Commits requested per backend call
    pub batch_size: usize,
    /// Message keywords passed to the backend
    pub keywords: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            start: None,
            limit: None,
            batch_size: DEFAULT_BATCH_SIZE,
            keywords: Vec::new(),
        }
    }
}

/// Lazy, ascending walk over the commit history.
///
/// Each page starts strictly after the last revision already yielded, so a
/// commit is never produced twice. The first backend error is yielded once
/// and ends the walk.
pub struct RevisionSource<'a, P: VcsProvider + ?Sized> {
    provider: &'a P,
    options: ScanOptions,
    cursor: Option<Revision>,
    buffer: VecDeque<Commit>,
    yielded: usize,
    pages: usize,
    finished: bool,
}

impl<'a, P: VcsProvider + ?Sized> RevisionSource<'a, P> {
    pub fn new(provider: &'a P, options: ScanOptions) -> Self {
        let cursor = options.start.and_then(|start| start.checked_sub(1));
        Self {
            provider,
            options,
            cursor,
            buffer: VecDeque::new(),
            yielded: 0,
            pages: 0,
            finished: false,
        }
    }

    /// Whether the walk stopped because `limit` commits were yielded
    pub fn hit_limit(&self) -> bool {
        self.options.limit.is_some_and(|limit| self.yielded >= limit)
    }

    /// Number of backend page requests made so far
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// Last revision yielded
    pub fn cursor(&self) -> Option<Revision> {
        self.cursor
    }

    fn fetch_page(&mut self) -> Result<(), VcsError> {
        let remaining = self
            .options
            .limit
            .map_or(usize::MAX, |limit| limit.saturating_sub(self.yielded));
        let request = self.options.batch_size.min(remaining).max(1);

        let page = self
            .provider
            .list_commit_page(self.cursor, request, &self.options.keywords)?;
        self.pages += 1;

        let received = page.len();
        let after = self.cursor;
        let mut fresh: Vec<Commit> = page
            .into_iter()
            .filter(|commit| after.map_or(true, |after| commit.revision > after))
            .collect();
        fresh.sort_by_key(|commit| commit.revision);
        fresh.dedup_by_key(|commit| commit.revision);

        if fresh.len() < received {
            warn!(
                received,
                kept = fresh.len(),
                after = ?after,
                "Dropped commits at or below the page boundary"
            );
        }

        debug!(
            page = self.pages,
            after = ?after,
            commits = fresh.len(),
            "Fetched commit page"
        );

        if fresh.is_empty() {
            self.finished = true;
        }
        self.buffer.extend(fresh);
        Ok(())
    }
}

impl<P: VcsProvider + ?Sized> Iterator for RevisionSource<'_, P> {
    type Item = Result<Commit, VcsError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.hit_limit() {
                self.finished = true;
                self.buffer.clear();
                return None;
            }

            if let Some(commit) = self.buffer.pop_front() {
                self.cursor = Some(commit.revision);
                self.yielded += 1;
                return Some(Ok(commit));
            }

            if self.finished {
                return None;
            }

            if let Err(e) = self.fetch_page() {
                self.finished = true;
                return Some(Err(e));
            }
        }
    }
}

impl<P: VcsProvider + ?Sized> std::iter::FusedIterator for RevisionSource<'_, P> {}
