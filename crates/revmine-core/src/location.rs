use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

const MAX_SLUG_CHARS: usize = 64;

/// Output directory for the repository identified by `identity`
pub fn output_dir(root: &Path, identity: &str) -> PathBuf {
    root.join(output_dir_name(identity))
}

/// Path-safe directory name: a readable slug of the identity plus a short
/// hash that keeps distinct identities apart.
pub fn output_dir_name(identity: &str) -> String {
    let mut slug = String::with_capacity(identity.len());
    for c in identity.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '_' {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug: String = slug
        .trim_matches(|c| c == '-' || c == '.')
        .chars()
        .take(MAX_SLUG_CHARS)
        .collect();
    let slug = if slug.is_empty() { "repo".to_string() } else { slug };

    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    let hash = hex::encode(hasher.finalize());

    format!("{}-{}", slug, &hash[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_path_safe() {
        let name = output_dir_name("svn://build.example.com:3690/Sword8/trunk");
        assert!(name.starts_with("svn-build.example.com-3690-sword8-trunk-"));
        assert!(name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_'));
    }

    #[test]
    fn test_name_is_stable_and_distinct() {
        let a = output_dir_name("https://example.com/a.git");
        assert_eq!(a, output_dir_name("https://example.com/a.git"));
        // Same slug, different identity
        assert_ne!(
            output_dir_name("https://example.com/A.git"),
            output_dir_name("https://example.com/a.git")
        );
    }

    #[test]
    fn test_degenerate_identity() {
        let name = output_dir_name("://");
        assert!(name.starts_with("repo-"));
        assert_eq!(name.len(), "repo-".len() + 8);
        assert!(!output_dir_name("..").contains(".."));
    }

    #[test]
    fn test_output_dir_under_root() {
        let dir = output_dir(Path::new("/data/chunks"), "file:///srv/repo");
        assert!(dir.starts_with("/data/chunks"));
    }
}
