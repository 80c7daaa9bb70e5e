//! Project configuration file support for revmine.
//!
//! Loads configuration from `revmine.toml` in the working directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use revmine_core::ExtractConfig;

/// Project-level configuration loaded from `revmine.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Root directory for chunk output
    pub output: Option<PathBuf>,
    /// File extensions to extract
    pub extensions: Option<Vec<String>>,
    /// Records per chunk file
    pub threshold: Option<usize>,
    /// Unchanged lines that end a block
    pub context_gap: Option<usize>,
    /// Maximum commits to scan per run
    pub limit: Option<usize>,
    /// First revision to scan
    pub start: Option<u64>,
    /// Commits fetched per backend call
    pub batch_size: Option<usize>,
    /// Only commits whose message contains one of these
    pub keywords: Option<Vec<String>>,
    /// Primary text encoding of the repository
    pub encoding: Option<String>,
    /// Encodings tried when the primary one fails
    pub fallback_encodings: Option<Vec<String>>,
    /// Context radius of fetched diffs
    pub diff_context_lines: Option<u32>,
    /// Extension of chunk files
    pub chunk_extension: Option<String>,
    /// Language tag -> extensions
    pub languages: Option<BTreeMap<String, Vec<String>>>,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "revmine.toml";

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    /// Overlay the values present in the file onto `config`
    pub fn apply(self, config: &mut ExtractConfig) {
        if let Some(output) = self.output {
            config.output_root = output;
        }
        if let Some(extensions) = self.extensions {
            config.extensions = extensions;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(gap) = self.context_gap {
            config.context_gap = gap;
        }
        if let Some(limit) = self.limit {
            config.limit = Some(limit);
        }
        if let Some(start) = self.start {
            config.start = Some(start);
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(keywords) = self.keywords {
            config.keywords = keywords;
        }
        if let Some(encoding) = self.encoding {
            config.encoding = encoding;
        }
        if let Some(fallbacks) = self.fallback_encodings {
            config.fallback_encodings = fallbacks;
        }
        if let Some(lines) = self.diff_context_lines {
            config.diff_context_lines = lines;
        }
        if let Some(extension) = self.chunk_extension {
            config.chunk_extension = extension;
        }
        if let Some(languages) = self.languages {
            config.languages = languages;
        }
    }
}

/// Defaults, overlaid with `revmine.toml` from `working_dir` when present
pub fn load_extract_config(working_dir: &Path) -> Result<ExtractConfig> {
    let mut config = ExtractConfig::default();
    if let Some(project) = ProjectConfig::load(working_dir)? {
        project.apply(&mut config);
    }
    Ok(config)
}
