use std::path::{Path, PathBuf};

use chrono::DateTime;
use git2::{Delta, DiffFormat, DiffOptions, Oid, Repository, Tree};
use tracing::debug;

use crate::decode::TextDecoder;
use crate::provider::{VcsError, VcsProvider};
use crate::types::{ChangeAction, ChangeEntry, Commit, Revision};

/// git2 backend.
///
/// Revisions are 1-based positions on the first-parent chain of `HEAD`,
/// oldest first, captured when the provider is opened.
pub struct GitProvider {
    repo: Repository,
    chain: Vec<Oid>,
    decoder: TextDecoder,
    root: PathBuf,
}

impl GitProvider {
    pub fn open(path: &Path) -> Result<Self, VcsError> {
        let repo = Repository::discover(path)
            .map_err(|_| VcsError::NotARepo(path.display().to_string()))?;
        let chain = Self::first_parent_chain(&repo)?;
        let root = repo
            .workdir()
            .unwrap_or_else(|| repo.path())
            .to_path_buf();

        debug!(
            root = %root.display(),
            commits = chain.len(),
            "Opened git repository"
        );

        Ok(Self {
            repo,
            chain,
            decoder: TextDecoder::default(),
            root,
        })
    }

    pub fn with_decoder(mut self, decoder: TextDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Highest revision available
    pub fn head_revision(&self) -> Option<Revision> {
        (!self.chain.is_empty()).then_some(self.chain.len() as Revision)
    }

    fn first_parent_chain(repo: &Repository) -> Result<Vec<Oid>, VcsError> {
        let mut chain = Vec::new();
        let mut commit = match repo.head() {
            Ok(head) => head.peel_to_commit()?,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(chain),
            Err(e) => return Err(VcsError::GitOperationFailed(e)),
        };

        loop {
            chain.push(commit.id());
            if commit.parent_count() == 0 {
                break;
            }
            commit = commit.parent(0)?;
        }

        chain.reverse();
        Ok(chain)
    }

    fn oid_for(&self, revision: Revision) -> Result<Oid, VcsError> {
        revision
            .checked_sub(1)
            .and_then(|index| self.chain.get(index as usize))
            .copied()
            .ok_or(VcsError::UnknownRevision(revision))
    }

    /// Trees of the first parent (None for a root commit) and of the commit
    fn trees<'r>(commit: &git2::Commit<'r>) -> Result<(Option<Tree<'r>>, Tree<'r>), VcsError> {
        let tree = commit.tree()?;
        let parent_tree = if commit.parent_count() > 0 {
            Some(commit.parent(0)?.tree()?)
        } else {
            None
        };
        Ok((parent_tree, tree))
    }

    fn load_commit(&self, revision: Revision, oid: Oid) -> Result<Commit, VcsError> {
        let commit = self.repo.find_commit(oid)?;
        let (parent_tree, tree) = Self::trees(&commit)?;

        let mut diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)?;
        diff.find_similar(None)?;

        let changes = diff
            .deltas()
            .filter_map(|delta| {
                let action = match delta.status() {
                    Delta::Added => ChangeAction::Added,
                    Delta::Modified => ChangeAction::Modified,
                    Delta::Deleted => ChangeAction::Deleted,
                    Delta::Renamed | Delta::Copied | Delta::Typechange => ChangeAction::Replaced,
                    _ => return None,
                };
                let path = delta.new_file().path().or_else(|| delta.old_file().path())?;
                Some(ChangeEntry::new(action, path.to_string_lossy()))
            })
            .collect();

        let author = commit.author();
        Ok(Commit {
            revision,
            id: oid.to_string(),
            author: author.name().unwrap_or("unknown").to_string(),
            message: self.decoder.decode(commit.message_bytes()),
            timestamp: DateTime::from_timestamp(commit.time().seconds(), 0).unwrap_or_default(),
            changes,
        })
    }
}

impl VcsProvider for GitProvider {
    fn name(&self) -> &str {
        "git"
    }

    fn repository_identity(&self) -> Result<String, VcsError> {
        if let Ok(remote) = self.repo.find_remote("origin") {
            if let Some(url) = remote.url() {
                return Ok(url.to_string());
            }
        }
        let canonical = self.root.canonicalize()?;
        Ok(format!("file://{}", canonical.display()))
    }

    fn list_commit_page(
        &self,
        after: Option<Revision>,
        batch_size: usize,
        keywords: &[String],
    ) -> Result<Vec<Commit>, VcsError> {
        let first = after.map_or(1, |after| after.saturating_add(1));
        let mut page = Vec::new();

        for (index, oid) in self.chain.iter().enumerate().skip((first - 1) as usize) {
            if page.len() >= batch_size {
                break;
            }
            let commit = self.load_commit(index as Revision + 1, *oid)?;
            if commit.matches_keywords(keywords) {
                page.push(commit);
            }
        }

        Ok(page)
    }

    fn diff(&self, revision: Revision, path: &str, context_lines: u32) -> Result<String, VcsError> {
        let commit = self.repo.find_commit(self.oid_for(revision)?)?;
        let (parent_tree, tree) = Self::trees(&commit)?;

        let mut opts = DiffOptions::new();
        opts.pathspec(path)
            .disable_pathspec_match(true)
            .context_lines(context_lines);

        let diff = self
            .repo
            .diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

        let mut raw = Vec::new();
        diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
            match line.origin() {
                origin @ ('+' | '-' | ' ') => {
                    raw.push(origin as u8);
                    raw.extend_from_slice(line.content());
                    // Last line of a file without a trailing newline
                    if !line.content().ends_with(b"\n") {
                        raw.push(b'\n');
                    }
                }
                'F' => raw.extend_from_slice(&normalize_file_header(line.content())),
                'H' => raw.extend_from_slice(line.content()),
                // End-of-file newline markers
                _ => {}
            }
            true
        })?;

        debug!(revision, path, bytes = raw.len(), "Fetched diff");

        Ok(self.decoder.decode(&raw))
    }
}

/// Reduce git's file header to the four lines `diff --git`, `index`, `---`
/// and `+++`.
///
/// Mode, rename and similarity lines vary in number; hunks are read after a
/// fixed-size header. A header without `---`/`+++` (no content change) is
/// passed through with only those extra lines removed.
fn normalize_file_header(content: &[u8]) -> Vec<u8> {
    let lines: Vec<&[u8]> = content
        .split(|&b| b == b'\n')
        .filter(|line| !line.is_empty())
        .collect();
    let diff_line = find_line(&lines, b"diff --git ");
    let index_line = find_line(&lines, b"index ");
    let old_line = find_line(&lines, b"--- ");
    let new_line = find_line(&lines, b"+++ ");

    let mut out = Vec::with_capacity(content.len());
    let mut push = |line: &[u8]| {
        out.extend_from_slice(line);
        out.push(b'\n');
    };

    match (old_line, new_line) {
        (Some(old_line), Some(new_line)) => {
            push(diff_line.unwrap_or(&b"diff --git"[..]));
            push(index_line.unwrap_or(&b"index 0000000..0000000"[..]));
            push(old_line);
            push(new_line);
        }
        _ => {
            for line in [diff_line, index_line].into_iter().flatten() {
                push(line);
            }
        }
    }
    out
}

fn find_line<'a>(lines: &[&'a [u8]], prefix: &[u8]) -> Option<&'a [u8]> {
    lines.iter().copied().find(|line| line.starts_with(prefix))
}
