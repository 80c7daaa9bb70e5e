use serde::{Deserialize, Serialize};

/// Inclusive range of revisions covered by one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheRange {
    pub low: u64,
    pub high: u64,
}

impl CacheRange {
    /// Build a range from two bounds given in either order
    pub fn new(a: u64, b: u64) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub fn contains(&self, revision: u64) -> bool {
        self.low <= revision && revision <= self.high
    }

    /// Chunk file name for this range
    pub fn file_name(&self, extension: &str) -> String {
        format!("{}-{}.{}", self.low, self.high, extension)
    }

    /// Parse a chunk file name (`{a}-{b}.{extension}`), normalizing the bounds
    pub fn parse_file_name(name: &str, extension: &str) -> Option<Self> {
        let stem = name.strip_suffix(extension)?.strip_suffix('.')?;
        let (a, b) = stem.split_once('-')?;
        Some(Self::new(a.parse().ok()?, b.parse().ok()?))
    }
}

impl std::fmt::Display for CacheRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_normalized() {
        assert_eq!(CacheRange::new(150, 100), CacheRange { low: 100, high: 150 });
    }

    #[test]
    fn test_contains_is_inclusive() {
        let range = CacheRange::new(100, 150);
        assert!(range.contains(100));
        assert!(range.contains(150));
        assert!(!range.contains(99));
        assert!(!range.contains(151));
    }

    #[test]
    fn test_file_name_round_trip() {
        let range = CacheRange::new(7, 42);
        assert_eq!(range.file_name("md"), "7-42.md");
        assert_eq!(CacheRange::parse_file_name("7-42.md", "md"), Some(range));
    }

    #[test]
    fn test_parse_reversed_bounds() {
        assert_eq!(
            CacheRange::parse_file_name("300-120.txt", "txt"),
            Some(CacheRange::new(120, 300))
        );
    }

    #[test]
    fn test_parse_rejects_other_files() {
        assert_eq!(CacheRange::parse_file_name("7-42.md", "txt"), None);
        assert_eq!(CacheRange::parse_file_name("notes.md", "md"), None);
        assert_eq!(CacheRange::parse_file_name("1-2-3.md", "md"), None);
        assert_eq!(CacheRange::parse_file_name(".7-42.abc123.tmp", "md"), None);
        assert_eq!(CacheRange::parse_file_name("7-42md", "md"), None);
    }
}
