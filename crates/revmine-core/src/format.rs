use std::fmt::Write;

use revmine_segment::DiffBlock;
use revmine_vcs::Commit;

/// Renders the blocks of one changed file as a markdown record
#[derive(Debug, Clone, Default)]
pub struct RecordFormatter;

impl RecordFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Returns `None` when no block survives (every block blank).
    pub fn format_change(
        &self,
        commit: &Commit,
        path: &str,
        language: &str,
        blocks: &[DiffBlock],
    ) -> Option<String> {
        let mut body = String::new();
        for block in blocks.iter().filter(|b| !b.is_blank()) {
            let _ = write!(
                body,
                "### Original:\n```{lang}\n{}\n```\n### Modified:\n```{lang}\n{}\n```\n",
                block.original,
                block.modified,
                lang = language
            );
        }

        if body.is_empty() {
            return None;
        }

        let mut record = format!("## r{}: {}\n", commit.revision, commit.summary());
        for line in message_body(&commit.message) {
            record.push_str("> ");
            record.push_str(line);
            record.push('\n');
        }
        let _ = write!(record, "### FILE: {}\n{}\n", path, body);
        Some(record)
    }
}

/// Message lines after the summary, without surrounding blank lines
fn message_body(message: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = message.lines().skip(1).map(str::trim_end).collect();
    while lines.first().is_some_and(|l| l.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    lines
}
