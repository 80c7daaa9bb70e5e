use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Monotonically increasing commit number
pub type Revision = u64;

/// How a commit affected a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Added,
    Modified,
    Deleted,
    Replaced,
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeAction::Added => write!(f, "A"),
            ChangeAction::Modified => write!(f, "M"),
            ChangeAction::Deleted => write!(f, "D"),
            ChangeAction::Replaced => write!(f, "R"),
        }
    }
}

/// A single path touched by a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub action: ChangeAction,
    /// Repository-relative path with `/` separators
    pub path: String,
}

impl ChangeEntry {
    pub fn new(action: ChangeAction, path: impl Into<String>) -> Self {
        Self {
            action,
            path: path.into(),
        }
    }

    pub fn is_modified(&self) -> bool {
        self.action == ChangeAction::Modified
    }

    /// Lowercased extension of the path, without the dot
    pub fn extension(&self) -> Option<String> {
        let file_name = self.path.rsplit('/').next()?;
        let (_, ext) = file_name.rsplit_once('.')?;
        Some(ext.to_lowercase())
    }
}

/// One commit of the history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub revision: Revision,
    /// Backend identifier (e.g. the commit hash)
    pub id: String,
    pub author: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub changes: Vec<ChangeEntry>,
}

impl Commit {
    /// First line of the message
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }

    /// Case-insensitive keyword match on the message; an empty filter matches
    /// every commit, otherwise any keyword is enough.
    pub fn matches_keywords(&self, keywords: &[String]) -> bool {
        if keywords.is_empty() {
            return true;
        }
        let message = self.message.to_lowercase();
        keywords
            .iter()
            .any(|keyword| message.contains(&keyword.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(message: &str) -> Commit {
        Commit {
            revision: 1,
            id: "r1".to_string(),
            author: "dev".to_string(),
            message: message.to_string(),
            timestamp: Utc::now(),
            changes: vec![],
        }
    }

    #[test]
    fn test_extension() {
        let entry = ChangeEntry::new(ChangeAction::Modified, "src/Game.CPP");
        assert_eq!(entry.extension(), Some("cpp".to_string()));

        let entry = ChangeEntry::new(ChangeAction::Modified, "dir.v2/Makefile");
        assert_eq!(entry.extension(), None);
    }

    #[test]
    fn test_summary_is_first_line() {
        assert_eq!(commit("fix crash\n\nlong body").summary(), "fix crash");
        assert_eq!(commit("").summary(), "");
    }

    #[test]
    fn test_keyword_matching() {
        let c = commit("Fix NPC pathing bug");
        assert!(c.matches_keywords(&[]));
        assert!(c.matches_keywords(&["npc".to_string()]));
        assert!(c.matches_keywords(&["ui".to_string(), "BUG".to_string()]));
        assert!(!c.matches_keywords(&["quest".to_string()]));
    }

    #[test]
    fn test_action_display() {
        assert_eq!(ChangeAction::Modified.to_string(), "M");
        assert_eq!(ChangeAction::Replaced.to_string(), "R");
    }
}
