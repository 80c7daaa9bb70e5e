use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info};

use crate::index::CacheIndex;
use crate::range::CacheRange;

/// Default extension of chunk files
pub const DEFAULT_CHUNK_EXTENSION: &str = "md";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read output directory {}: {source}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },

    #[error("Failed to create output directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Failed to write chunk {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("Failed to persist chunk {}: {source}", path.display())]
    Persist { path: PathBuf, source: io::Error },
}

/// Records accumulated since the last flush
#[derive(Debug, Clone, Default)]
pub struct OutputChunk {
    records: Vec<String>,
    range: Option<CacheRange>,
}

impl OutputChunk {
    pub fn push(&mut self, record: String, revision: u64) {
        self.records.push(record);
        self.note(revision);
    }

    /// Widen the covered range without adding a record
    pub fn note(&mut self, revision: u64) {
        self.range = Some(match self.range {
            Some(range) => CacheRange::new(range.low.min(revision), range.high.max(revision)),
            None => CacheRange::new(revision, revision),
        });
    }

    pub fn range(&self) -> Option<CacheRange> {
        self.range
    }

    pub fn records(&self) -> &[String] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no revision has been accumulated
    pub fn is_empty(&self) -> bool {
        self.range.is_none()
    }

    pub fn render(&self) -> String {
        self.records.concat()
    }

    fn clear(&mut self) {
        self.records.clear();
        self.range = None;
    }
}

/// Accumulates formatted records and writes them out as chunk files
#[derive(Debug)]
pub struct OutputBatcher {
    dir: PathBuf,
    extension: String,
    threshold: usize,
    chunk: OutputChunk,
    chunks_written: usize,
}

impl OutputBatcher {
    pub fn new(dir: PathBuf, threshold: usize) -> Self {
        Self {
            dir,
            extension: DEFAULT_CHUNK_EXTENSION.to_string(),
            threshold: threshold.max(1),
            chunk: OutputChunk::default(),
            chunks_written: 0,
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn pending(&self) -> &OutputChunk {
        &self.chunk
    }

    pub fn chunks_written(&self) -> usize {
        self.chunks_written
    }

    pub fn append(&mut self, record: String, revision: u64) {
        self.chunk.push(record, revision);
    }

    /// Mark a revision as handled even though it produced no record
    pub fn note_revision(&mut self, revision: u64) {
        self.chunk.note(revision);
    }

    pub fn flush_if_threshold_exceeded(
        &mut self,
        index: &mut CacheIndex,
    ) -> Result<Option<PathBuf>, StoreError> {
        if self.chunk.len() >= self.threshold {
            self.flush(index)
        } else {
            Ok(None)
        }
    }

    /// Persist the pending chunk and register its range with `index`.
    ///
    /// Returns `None` when nothing has been accumulated.
    pub fn flush(&mut self, index: &mut CacheIndex) -> Result<Option<PathBuf>, StoreError> {
        let Some(range) = self.chunk.range() else {
            return Ok(None);
        };

        let staged = self.stage(range)?;
        let path = self.dir.join(range.file_name(&self.extension));
        staged.persist(&path).map_err(|e| StoreError::Persist {
            path: path.clone(),
            source: e.error,
        })?;

        index.register(range);
        info!(
            range = %range,
            records = self.chunk.len(),
            path = %path.display(),
            "Flushed chunk"
        );

        self.chunk.clear();
        self.chunks_written += 1;

        Ok(Some(path))
    }

    /// Write the pending records to a temporary file next to the final path
    fn stage(&self, range: CacheRange) -> Result<NamedTempFile, StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let write_err = |source| StoreError::Write {
            path: self.dir.join(range.file_name(&self.extension)),
            source,
        };

        let mut file = tempfile::Builder::new()
            .prefix(&format!(".{}.", range))
            .suffix(".tmp")
            .tempfile_in(&self.dir)
            .map_err(write_err)?;
        file.write_all(self.chunk.render().as_bytes())
            .map_err(write_err)?;
        file.as_file().sync_all().map_err(write_err)?;

        debug!(tmp = %file.path().display(), "Staged chunk");

        Ok(file)
    }
}
