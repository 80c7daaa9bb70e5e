use serde::{Deserialize, Serialize};

/// Marker of a line inside a hunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineMarker {
    Context,
    Added,
    Removed,
}

/// One line of hunk content with its marker stripped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffLine<'a> {
    pub marker: LineMarker,
    pub text: &'a str,
}

impl<'a> DiffLine<'a> {
    /// Classify a raw hunk line.
    ///
    /// Anything that is not `+` or `-` counts as context, including
    /// `\ No newline at end of file` and empty lines. The first character is
    /// always treated as the marker column.
    pub fn parse(raw: &'a str) -> Self {
        let marker = if raw.starts_with('+') {
            LineMarker::Added
        } else if raw.starts_with('-') {
            LineMarker::Removed
        } else {
            LineMarker::Context
        };

        let mut chars = raw.chars();
        chars.next();

        Self {
            marker,
            text: chars.as_str(),
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self.marker, LineMarker::Context)
    }

    /// Whether the line belongs to the pre-image of the file
    pub fn in_original(&self) -> bool {
        !matches!(self.marker, LineMarker::Added)
    }

    /// Whether the line belongs to the post-image of the file
    pub fn in_modified(&self) -> bool {
        !matches!(self.marker, LineMarker::Removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_markers() {
        assert_eq!(DiffLine::parse("+new").marker, LineMarker::Added);
        assert_eq!(DiffLine::parse("-old").marker, LineMarker::Removed);
        assert_eq!(DiffLine::parse(" same").marker, LineMarker::Context);
        assert_eq!(DiffLine::parse("").marker, LineMarker::Context);
    }

    #[test]
    fn test_parse_strips_marker_column() {
        assert_eq!(DiffLine::parse("+  indented").text, "  indented");
        assert_eq!(DiffLine::parse(" ").text, "");
        assert_eq!(DiffLine::parse("").text, "");
    }

    #[test]
    fn test_parse_multibyte_first_char() {
        // Context lines from a mangled diff may lack the leading space
        let line = DiffLine::parse("é-suffix");
        assert_eq!(line.marker, LineMarker::Context);
        assert_eq!(line.text, "-suffix");
    }

    #[test]
    fn test_sides() {
        let added = DiffLine::parse("+x");
        assert!(added.is_change());
        assert!(!added.in_original());
        assert!(added.in_modified());

        let context = DiffLine::parse(" x");
        assert!(!context.is_change());
        assert!(context.in_original());
        assert!(context.in_modified());
    }
}
