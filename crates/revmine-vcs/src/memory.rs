use std::cell::Cell;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::provider::{VcsError, VcsProvider};
use crate::types::{ChangeEntry, Commit, Revision};

/// In-memory backend holding commits and their per-file diffs.
///
/// Counts the calls made against it so callers can check how much of the
/// history was actually fetched.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    identity: String,
    commits: BTreeMap<Revision, Commit>,
    diffs: HashMap<(Revision, String), String>,
    failing_diffs: HashSet<Revision>,
    fail_pages: bool,
    page_requests: Cell<usize>,
    diff_requests: Cell<usize>,
}

impl MemoryProvider {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            ..Default::default()
        }
    }

    pub fn add_commit(&mut self, revision: Revision, message: &str, changes: Vec<ChangeEntry>) {
        let timestamp = DateTime::from_timestamp(1_700_000_000 + revision as i64 * 60, 0)
            .unwrap_or_default();
        self.commits.insert(
            revision,
            Commit {
                revision,
                id: format!("r{}", revision),
                author: "fixture".to_string(),
                message: message.to_string(),
                timestamp,
                changes,
            },
        );
    }

    pub fn add_diff(&mut self, revision: Revision, path: &str, diff: impl Into<String>) {
        self.diffs.insert((revision, path.to_string()), diff.into());
    }

    /// Make every diff request for `revision` fail
    pub fn fail_diff_at(&mut self, revision: Revision) {
        self.failing_diffs.insert(revision);
    }

    /// Make every page request fail
    pub fn fail_pages(&mut self, fail: bool) {
        self.fail_pages = fail;
    }

    pub fn page_requests(&self) -> usize {
        self.page_requests.get()
    }

    pub fn diff_requests(&self) -> usize {
        self.diff_requests.get()
    }
}

impl VcsProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn repository_identity(&self) -> Result<String, VcsError> {
        Ok(self.identity.clone())
    }

    fn list_commit_page(
        &self,
        after: Option<Revision>,
        batch_size: usize,
        keywords: &[String],
    ) -> Result<Vec<Commit>, VcsError> {
        self.page_requests.set(self.page_requests.get() + 1);
        if self.fail_pages {
            return Err(VcsError::InvocationFailed("log request refused".to_string()));
        }

        let lower = after.map_or(0, |after| after.saturating_add(1));
        Ok(self
            .commits
            .range(lower..)
            .map(|(_, commit)| commit)
            .filter(|commit| commit.matches_keywords(keywords))
            .take(batch_size)
            .cloned()
            .collect())
    }

    fn diff(&self, revision: Revision, path: &str, _context_lines: u32) -> Result<String, VcsError> {
        self.diff_requests.set(self.diff_requests.get() + 1);
        if self.failing_diffs.contains(&revision) {
            return Err(VcsError::InvocationFailed(format!(
                "diff of {} at r{} refused",
                path, revision
            )));
        }
        if !self.commits.contains_key(&revision) {
            return Err(VcsError::UnknownRevision(revision));
        }
        Ok(self
            .diffs
            .get(&(revision, path.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
