use std::fs;

use revmine_store::{CacheIndex, CacheRange, OutputBatcher};
use tempfile::TempDir;

#[test]
fn test_load_scans_chunk_names_only() {
    let dir = TempDir::new().unwrap();
    for name in ["1-20.md", "150-100.md", "21-40.txt", "notes.md", ".41-60.x1y2.tmp"] {
        fs::write(dir.path().join(name), "").unwrap();
    }
    fs::create_dir(dir.path().join("nested")).unwrap();

    let index = CacheIndex::load(dir.path(), "md").unwrap();

    assert_eq!(
        index.ranges(),
        &[CacheRange::new(1, 20), CacheRange::new(100, 150)]
    );
    assert!(index.is_processed(120));
    assert!(!index.is_processed(30));
    assert!(!index.is_processed(50));
    assert_eq!(index.highest(), Some(150));
}

#[test]
fn test_missing_directory_is_empty() {
    let dir = TempDir::new().unwrap();
    let index = CacheIndex::load(&dir.path().join("never-created"), "md").unwrap();
    assert!(index.is_empty());
}

#[test]
fn test_flushed_chunks_are_found_on_next_load() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("repo");

    let mut index = CacheIndex::load(&out, "md").unwrap();
    let mut batcher = OutputBatcher::new(out.clone(), 1);
    batcher.append("## r3: one\n".to_string(), 3);
    batcher.flush_if_threshold_exceeded(&mut index).unwrap();
    batcher.append("## r9: two\n".to_string(), 9);
    batcher.flush_if_threshold_exceeded(&mut index).unwrap();

    let reloaded = CacheIndex::load(&out, "md").unwrap();

    assert_eq!(reloaded.ranges(), index.ranges());
    assert!(reloaded.is_processed(3));
    assert!(reloaded.is_processed(9));
    assert!(!reloaded.is_processed(5));
}
