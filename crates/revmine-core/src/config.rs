use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use revmine_segment::{Segmenter, DEFAULT_CONTEXT_GAP};
use revmine_store::DEFAULT_CHUNK_EXTENSION;
use revmine_vcs::{ScanOptions, TextDecoder, DEFAULT_BATCH_SIZE};

use crate::error::ExtractError;

/// Directory under the local data dir that holds per-repository chunk folders
pub const DEFAULT_OUTPUT_SUBDIR: &str = "revmine/chunks";

/// Settings for one extraction run
#[derive(Debug, Clone, Serialize)]
pub struct ExtractConfig {
    /// Root under which the per-repository output directory is created
    pub output_root: PathBuf,
    /// File extensions eligible for extraction (leading dot optional)
    pub extensions: Vec<String>,
    /// Language tag -> extensions rendered with that tag
    pub languages: BTreeMap<String, Vec<String>>,
    /// Records per chunk before a flush
    pub threshold: usize,
    /// Unchanged lines that end a block
    pub context_gap: usize,
    /// Maximum number of commits to scan (None = unlimited)
    pub limit: Option<usize>,
    /// First revision to scan (inclusive)
    pub start: Option<u64>,
    pub batch_size: usize,
    pub keywords: Vec<String>,
    pub encoding: String,
    pub fallback_encodings: Vec<String>,
    /// Context radius requested from the backend for each diff
    pub diff_context_lines: u32,
    pub chunk_extension: String,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        let output_root = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_OUTPUT_SUBDIR);

        let languages = BTreeMap::from([
            (
                "c++".to_string(),
                ["c", "h", "hpp", "cc", "cpp"].map(String::from).to_vec(),
            ),
            ("lua".to_string(), ["lua", "lh", "ls"].map(String::from).to_vec()),
        ]);

        Self {
            output_root,
            extensions: [".lua", ".c", ".cpp", ".h", ".lh", ".hpp"]
                .map(String::from)
                .to_vec(),
            languages,
            threshold: 100,
            context_gap: DEFAULT_CONTEXT_GAP,
            limit: Some(10_000),
            start: None,
            batch_size: DEFAULT_BATCH_SIZE,
            keywords: Vec::new(),
            encoding: "utf-8".to_string(),
            fallback_encodings: vec!["gbk".to_string()],
            diff_context_lines: 20,
            chunk_extension: DEFAULT_CHUNK_EXTENSION.to_string(),
        }
    }
}

impl ExtractConfig {
    pub fn validate(&self) -> Result<(), ExtractError> {
        if self.context_gap == 0 {
            return Err(ExtractError::Config(
                "context gap must be at least 1".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(ExtractError::Config(
                "batch size must be at least 1".to_string(),
            ));
        }
        if self.threshold == 0 {
            return Err(ExtractError::Config(
                "chunk threshold must be at least 1".to_string(),
            ));
        }
        if self.chunk_extension.trim_start_matches('.').is_empty() {
            return Err(ExtractError::Config(
                "chunk extension must not be empty".to_string(),
            ));
        }
        self.decoder()?;
        Ok(())
    }

    /// Whether changes to `extension` (lowercase, no dot) are extracted
    pub fn is_allowed(&self, extension: &str) -> bool {
        self.extensions
            .iter()
            .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }

    /// Language tag for `extension`, or an empty tag when none matches
    pub fn language_for(&self, extension: &str) -> &str {
        self.languages
            .iter()
            .find(|(_, exts)| exts.iter().any(|e| e.eq_ignore_ascii_case(extension)))
            .map(|(lang, _)| lang.as_str())
            .unwrap_or("")
    }

    pub fn decoder(&self) -> Result<TextDecoder, ExtractError> {
        TextDecoder::new(&self.encoding, &self.fallback_encodings)
            .map_err(|e| ExtractError::Config(e.to_string()))
    }

    pub fn segmenter(&self) -> Result<Segmenter, ExtractError> {
        Ok(Segmenter::new(self.context_gap)?)
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            start: self.start,
            limit: self.limit,
            batch_size: self.batch_size,
            keywords: self.keywords.clone(),
        }
    }

    /// Chunk extension without a leading dot
    pub fn chunk_extension(&self) -> &str {
        self.chunk_extension.trim_start_matches('.')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ExtractConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.threshold, 100);
        assert_eq!(config.context_gap, 5);
        assert_eq!(config.limit, Some(10_000));
        assert_eq!(config.diff_context_lines, 20);
        assert!(config.output_root.ends_with("revmine/chunks"));
    }

    #[test]
    fn test_allowed_extensions() {
        let config = ExtractConfig::default();
        assert!(config.is_allowed("lua"));
        assert!(config.is_allowed("hpp"));
        assert!(config.is_allowed("LH"));
        assert!(!config.is_allowed("txt"));
        assert!(!config.is_allowed("cc"));
    }

    #[test]
    fn test_language_lookup() {
        let config = ExtractConfig::default();
        assert_eq!(config.language_for("cpp"), "c++");
        assert_eq!(config.language_for("lh"), "lua");
        assert_eq!(config.language_for("py"), "");
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        for config in [
            ExtractConfig {
                context_gap: 0,
                ..Default::default()
            },
            ExtractConfig {
                batch_size: 0,
                ..Default::default()
            },
            ExtractConfig {
                threshold: 0,
                ..Default::default()
            },
        ] {
            assert!(matches!(config.validate(), Err(ExtractError::Config(_))));
        }
    }

    #[test]
    fn test_validate_rejects_unknown_encoding() {
        let config = ExtractConfig {
            fallback_encodings: vec!["klingon".to_string()],
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("klingon"));
    }
}
