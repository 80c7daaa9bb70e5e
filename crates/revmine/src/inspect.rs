//! Read-only subcommands: cache status and ad-hoc segmentation.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

use revmine_core::{output_dir, ExtractConfig};
use revmine_segment::{DiffBlock, DiffStat, Segmenter};
use revmine_store::{CacheIndex, CacheRange};
use revmine_vcs::{GitProvider, VcsProvider};

#[derive(Debug, Serialize)]
pub struct CacheStatus {
    pub identity: String,
    pub output_dir: PathBuf,
    pub ranges: Vec<CacheRange>,
    pub covered: u64,
    pub highest: Option<u64>,
    pub head: Option<u64>,
}

/// Summarize the chunks already written for the repository at `repo`
pub fn cache_status(repo: &Path, config: &ExtractConfig) -> Result<CacheStatus> {
    let provider = GitProvider::open(repo)
        .with_context(|| format!("Failed to open repository at {}", repo.display()))?;
    let identity = provider.repository_identity()?;
    let dir = output_dir(&config.output_root, &identity);
    let index = CacheIndex::load(&dir, config.chunk_extension())?;

    Ok(CacheStatus {
        identity,
        output_dir: dir,
        ranges: index.ranges().to_vec(),
        covered: index.covered(),
        highest: index.highest(),
        head: provider.head_revision(),
    })
}

pub fn print_status(status: &CacheStatus) {
    println!("{} {}", "Repository:".bold(), status.identity);
    println!("{} {}", "Output:".bold(), status.output_dir.display());

    if status.ranges.is_empty() {
        println!("{}", "No chunks written yet.".dimmed());
        return;
    }

    println!("{}", "Cached ranges:".bold());
    for range in &status.ranges {
        println!("  r{}..r{}", range.low, range.high);
    }
    println!(
        "{} {} revision(s), highest r{}",
        "Covered:".bold(),
        status.covered,
        status.highest.unwrap_or_default()
    );
    if let Some(head) = status.head {
        println!("{} r{}", "Head:".bold(), head);
    }
}

/// Segment a saved diff file
pub fn segment_file(
    path: &Path,
    config: &ExtractConfig,
) -> Result<(Vec<DiffBlock>, DiffStat)> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let diff = config.decoder()?.decode(&bytes);
    let segmenter = Segmenter::new(config.context_gap)?;
    let blocks = segmenter
        .segment(&diff)
        .with_context(|| format!("Failed to segment {}", path.display()))?;
    Ok((blocks, DiffStat::from_diff(&diff)))
}

pub fn print_blocks(blocks: &[DiffBlock], stat: &DiffStat) {
    for (i, block) in blocks.iter().enumerate() {
        println!("{}", format!("=== Block {} ===", i + 1).bright_cyan().bold());
        println!("{}", "Original:".dimmed());
        println!("{}", block.original);
        println!("{}", "Modified:".dimmed());
        println!("{}", block.modified);
        println!();
    }
    eprintln!(
        "{} block(s), {} added, {} removed",
        blocks.len(),
        stat.added.to_string().green(),
        stat.removed.to_string().red()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_segment_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("change.diff");
        std::fs::write(
            &path,
            "Index: a.lua\n====\n--- a.lua\n+++ a.lua\n@@ -1,7 +1,7 @@\n-a\n+b\n \n \n \n \n \n \n",
        )
        .unwrap();

        let (blocks, stat) = segment_file(&path, &ExtractConfig::default()).unwrap();

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].original, "a");
        assert_eq!(blocks[0].modified, "b");
        assert_eq!(stat.added, 1);
        assert_eq!(stat.removed, 1);
    }

    #[test]
    fn test_segment_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = segment_file(&dir.path().join("nope.diff"), &ExtractConfig::default());
        assert!(result.is_err());
    }
}
