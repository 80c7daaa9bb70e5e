use std::fs;
use std::path::Path;

use git2::{Repository, Signature};
use revmine_segment::Segmenter;
use revmine_vcs::{
    ChangeAction, GitProvider, RevisionSource, ScanOptions, TextDecoder, VcsError, VcsProvider,
};
use tempfile::TempDir;

/// Helper: write (or delete, when `content` is None) a file and commit it.
fn commit_change(repo: &Repository, path: &str, content: Option<&[u8]>, message: &str) {
    let workdir = repo.workdir().unwrap().to_path_buf();
    let full = workdir.join(path);
    let mut index = repo.index().unwrap();

    match content {
        Some(bytes) => {
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(&full, bytes).unwrap();
            index.add_path(Path::new(path)).unwrap();
        }
        None => {
            fs::remove_file(&full).unwrap();
            index.remove_path(Path::new(path)).unwrap();
        }
    }
    index.write().unwrap();

    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("Tester", "tester@example.com").unwrap();
    let parents = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => vec![],
    };
    let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap();
}

fn numbered_lines(count: usize, replace: Option<(usize, &str)>) -> String {
    (1..=count)
        .map(|i| match replace {
            Some((at, text)) if at == i => format!("{}\n", text),
            _ => format!("line {}\n", i),
        })
        .collect()
}

/// History: r1 adds two files, r2 modifies npc.lua, r3 deletes notes.txt.
fn create_test_repo() -> (TempDir, Repository) {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    commit_change(
        &repo,
        "scripts/npc.lua",
        Some(numbered_lines(30, None).as_bytes()),
        "Initial import",
    );
    commit_change(&repo, "notes.txt", Some(b"todo\n"), "Add notes");
    commit_change(
        &repo,
        "scripts/npc.lua",
        Some(numbered_lines(30, Some((15, "line fifteen"))).as_bytes()),
        "Fix NPC line handling",
    );
    commit_change(&repo, "notes.txt", None, "Drop notes");

    (dir, repo)
}

#[test]
fn test_revisions_follow_history_order() {
    let (dir, _repo) = create_test_repo();
    let provider = GitProvider::open(dir.path()).unwrap();

    let commits: Vec<_> = RevisionSource::new(&provider, ScanOptions::default())
        .map(|c| c.unwrap())
        .collect();

    assert_eq!(provider.head_revision(), Some(4));
    assert_eq!(
        commits.iter().map(|c| c.revision).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
    assert_eq!(commits[0].summary(), "Initial import");
    assert_eq!(commits[0].author, "Tester");
    assert_eq!(commits[0].id.len(), 40);
}

#[test]
fn test_change_actions() {
    let (dir, _repo) = create_test_repo();
    let provider = GitProvider::open(dir.path()).unwrap();

    let page = provider.list_commit_page(None, 10, &[]).unwrap();

    assert_eq!(page[0].changes.len(), 1);
    assert_eq!(page[0].changes[0].action, ChangeAction::Added);
    assert_eq!(page[0].changes[0].path, "scripts/npc.lua");
    assert_eq!(page[2].changes[0].action, ChangeAction::Modified);
    assert_eq!(page[3].changes[0].action, ChangeAction::Deleted);
    assert_eq!(page[3].changes[0].path, "notes.txt");
}

#[test]
fn test_page_boundary_is_exclusive() {
    let (dir, _repo) = create_test_repo();
    let provider = GitProvider::open(dir.path()).unwrap();

    let first = provider.list_commit_page(None, 2, &[]).unwrap();
    let second = provider.list_commit_page(Some(2), 2, &[]).unwrap();
    let third = provider.list_commit_page(Some(4), 2, &[]).unwrap();

    assert_eq!(first.iter().map(|c| c.revision).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(second.iter().map(|c| c.revision).collect::<Vec<_>>(), vec![3, 4]);
    assert!(third.is_empty());
}

#[test]
fn test_keyword_filter() {
    let (dir, _repo) = create_test_repo();
    let provider = GitProvider::open(dir.path()).unwrap();

    let page = provider
        .list_commit_page(None, 10, &["npc".to_string()])
        .unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(page[0].revision, 3);
}

#[test]
fn test_diff_segments_into_one_block() {
    let (dir, _repo) = create_test_repo();
    let provider = GitProvider::open(dir.path()).unwrap();

    let diff = provider.diff(3, "scripts/npc.lua", 20).unwrap();

    assert!(diff.starts_with("diff --git"));
    assert!(diff.lines().nth(4).unwrap().starts_with("@@"));
    assert!(diff.contains("-line 15\n"));
    assert!(diff.contains("+line fifteen\n"));

    let blocks = Segmenter::default().segment(&diff).unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(
        blocks[0].original,
        "line 10\nline 11\nline 12\nline 13\nline 14\nline 15\nline 16\nline 17\nline 18\nline 19"
    );
    assert!(blocks[0].modified.contains("line fifteen"));
}

#[test]
fn test_diff_context_radius() {
    let (dir, _repo) = create_test_repo();
    let provider = GitProvider::open(dir.path()).unwrap();

    let diff = provider.diff(3, "scripts/npc.lua", 2).unwrap();

    assert!(diff.contains(" line 13\n"));
    assert!(!diff.contains(" line 12\n"));
}

#[test]
fn test_diff_decodes_fallback_encoding() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit_change(&repo, "ui.lua", Some(b"a = 1\n"), "init");
    // "中文" in GBK
    commit_change(&repo, "ui.lua", Some(b"a = '\xD6\xD0\xCE\xC4'\n"), "gbk text");

    let decoder = TextDecoder::new("utf-8", &["gbk".to_string()]).unwrap();
    let provider = GitProvider::open(dir.path()).unwrap().with_decoder(decoder);

    let diff = provider.diff(2, "ui.lua", 3).unwrap();

    assert!(diff.contains("+a = '中文'"));
}

#[test]
fn test_diff_of_last_line_without_newline() {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit_change(&repo, "a.lua", Some(b"keep\nold"), "init");
    commit_change(&repo, "a.lua", Some(b"keep\nnew"), "edit last line");

    let provider = GitProvider::open(dir.path()).unwrap();
    let diff = provider.diff(2, "a.lua", 20).unwrap();

    assert!(diff.contains("\n-old\n+new\n"));
    let blocks = Segmenter::default().segment(&diff).unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].original, "keep\nold");
    assert_eq!(blocks[0].modified, "keep\nnew");
}

#[cfg(unix)]
#[test]
fn test_diff_header_stays_four_lines_on_mode_change() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    commit_change(&repo, "a.lua", Some(b"a = 1\nb = 2\n"), "init");

    let full = dir.path().join("a.lua");
    fs::write(&full, b"a = 1\nb = 3\n").unwrap();
    fs::set_permissions(&full, fs::Permissions::from_mode(0o755)).unwrap();
    commit_change(&repo, "a.lua", Some(b"a = 1\nb = 3\n"), "chmod and edit");

    let provider = GitProvider::open(dir.path()).unwrap();
    let page = provider.list_commit_page(Some(1), 10, &[]).unwrap();
    assert_eq!(page[0].changes[0].action, ChangeAction::Modified);

    let diff = provider.diff(2, "a.lua", 20).unwrap();

    assert!(!diff.contains("old mode"));
    let header: Vec<&str> = diff.lines().take(5).collect();
    assert!(header[0].starts_with("diff --git"));
    assert!(header[1].starts_with("index "));
    assert!(header[2].starts_with("--- "));
    assert!(header[3].starts_with("+++ "));
    assert!(header[4].starts_with("@@"));

    let blocks = Segmenter::default().segment(&diff).unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].original, "a = 1\nb = 2");
    assert_eq!(blocks[0].modified, "a = 1\nb = 3");
}

#[test]
fn test_identity_prefers_origin_remote() {
    let (dir, repo) = create_test_repo();
    repo.remote("origin", "https://example.com/game/sword.git")
        .unwrap();

    let provider = GitProvider::open(dir.path()).unwrap();

    assert_eq!(
        provider.repository_identity().unwrap(),
        "https://example.com/game/sword.git"
    );
}

#[test]
fn test_identity_falls_back_to_path() {
    let (dir, _repo) = create_test_repo();
    let provider = GitProvider::open(dir.path()).unwrap();

    let identity = provider.repository_identity().unwrap();

    assert!(identity.starts_with("file://"));
}

#[test]
fn test_unknown_revision() {
    let (dir, _repo) = create_test_repo();
    let provider = GitProvider::open(dir.path()).unwrap();

    assert!(matches!(
        provider.diff(99, "notes.txt", 3),
        Err(VcsError::UnknownRevision(99))
    ));
}

#[test]
fn test_not_a_repository() {
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        GitProvider::open(dir.path()),
        Err(VcsError::NotARepo(_))
    ));
}
