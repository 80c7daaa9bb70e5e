use thiserror::Error;

use crate::types::{Commit, Revision};

#[derive(Error, Debug)]
pub enum VcsError {
    #[error("Not a repository: {0}")]
    NotARepo(String),

    #[error("Git operation failed: {0}")]
    GitOperationFailed(#[from] git2::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unknown revision: {0}")]
    UnknownRevision(Revision),

    #[error("Backend invocation failed: {0}")]
    InvocationFailed(String),

    #[error("Unknown text encoding: {0}")]
    UnknownEncoding(String),
}

/// Backend that can list commits and produce per-file diffs
pub trait VcsProvider {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Stable identity of the repository (e.g. its canonical URL)
    fn repository_identity(&self) -> Result<String, VcsError>;

    /// Up to `batch_size` commits with revision strictly greater than
    /// `after`, ascending, restricted to messages matching `keywords`.
    fn list_commit_page(
        &self,
        after: Option<Revision>,
        batch_size: usize,
        keywords: &[String],
    ) -> Result<Vec<Commit>, VcsError>;

    /// Unified diff of `path` as changed by `revision`, decoded to text
    fn diff(&self, revision: Revision, path: &str, context_lines: u32)
        -> Result<String, VcsError>;
}
