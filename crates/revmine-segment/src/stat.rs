use serde::{Deserialize, Serialize};

use crate::line::{DiffLine, LineMarker};

/// Added/removed line counts of a single-file diff
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStat {
    pub added: usize,
    pub removed: usize,
}

impl DiffStat {
    /// Count changed lines inside hunks; file headers are not counted.
    pub fn from_diff(diff: &str) -> Self {
        let mut stat = Self::default();
        let mut in_hunk = false;

        for raw in diff.lines() {
            if raw.starts_with("@@") {
                in_hunk = true;
                continue;
            }
            if !in_hunk {
                continue;
            }
            match DiffLine::parse(raw).marker {
                LineMarker::Added => stat.added += 1,
                LineMarker::Removed => stat.removed += 1,
                LineMarker::Context => {}
            }
        }

        stat
    }

    pub fn total(&self) -> usize {
        self.added + self.removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_skip_file_headers() {
        let diff = "--- a.lua\n+++ a.lua\n@@ -1,3 +1,3 @@\n one\n-two\n+TWO\n+three\n";
        let stat = DiffStat::from_diff(diff);
        assert_eq!(stat, DiffStat { added: 2, removed: 1 });
        assert_eq!(stat.total(), 3);
    }

    #[test]
    fn test_removed_line_looking_like_header() {
        let diff = "--- a\n+++ a\n@@ -1 +0,0 @@\n--- not a header\n";
        assert_eq!(DiffStat::from_diff(diff).removed, 1);
    }
}
