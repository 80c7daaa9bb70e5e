use std::path::Path;

use tracing::{debug, trace};

use crate::batcher::StoreError;
use crate::range::CacheRange;

/// Revision ranges already persisted as chunks.
///
/// Loaded once per run; ranges registered afterwards only affect later
/// lookups.
#[derive(Debug, Clone, Default)]
pub struct CacheIndex {
    ranges: Vec<CacheRange>,
}

impl CacheIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `dir` for chunk files with the given extension.
    ///
    /// A missing directory yields an empty index. Files that do not follow
    /// the chunk naming scheme are ignored.
    pub fn load(dir: &Path, extension: &str) -> Result<Self, StoreError> {
        let mut index = Self::new();

        if !dir.exists() {
            debug!(dir = %dir.display(), "Output directory missing, starting with empty cache");
            return Ok(index);
        }

        let entries = std::fs::read_dir(dir).map_err(|source| StoreError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries {
            let entry = entry.map_err(|source| StoreError::ReadDir {
                path: dir.to_path_buf(),
                source,
            })?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };

            match CacheRange::parse_file_name(name, extension) {
                Some(range) => index.ranges.push(range),
                None => trace!(file = name, "Ignoring non-chunk file"),
            }
        }

        index.ranges.sort();

        debug!(
            dir = %dir.display(),
            ranges = index.ranges.len(),
            "Loaded cache index"
        );

        Ok(index)
    }

    pub fn is_processed(&self, revision: u64) -> bool {
        self.ranges.iter().any(|range| range.contains(revision))
    }

    pub fn register(&mut self, range: CacheRange) {
        let at = self.ranges.partition_point(|r| r < &range);
        self.ranges.insert(at, range);
    }

    /// Ranges sorted by lower bound
    pub fn ranges(&self) -> &[CacheRange] {
        &self.ranges
    }

    /// Highest revision covered by any range
    pub fn highest(&self) -> Option<u64> {
        self.ranges.iter().map(|range| range.high).max()
    }

    /// Total number of revisions covered
    pub fn covered(&self) -> u64 {
        self.ranges.iter().map(|r| r.high - r.low + 1).sum()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
