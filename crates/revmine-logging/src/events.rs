use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Structured log events for an extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    RunStarted {
        identity: String,
        output_dir: PathBuf,
        cached_ranges: usize,
    },
    CommitSkipped {
        revision: u64,
    },
    CommitProcessed {
        revision: u64,
        summary: String,
        files: usize,
        records: usize,
    },
    FileSkipped {
        revision: u64,
        path: String,
        reason: String,
    },
    ChunkFlushed {
        low: u64,
        high: u64,
        records: usize,
        path: PathBuf,
    },
    RunFinished {
        status: String,
        commits: usize,
        processed: usize,
        skipped: usize,
        records: usize,
        chunks: usize,
        duration_secs: f64,
    },
    ErrorEncountered {
        revision: Option<u64>,
        error: String,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Utc::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// Logger for run events - handles both console output and file logging
pub struct Logger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl Logger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create a logger with file output in addition to console
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        match self.format {
            LogFormat::Json => self.log_json(event),
            LogFormat::Pretty => self.log_pretty(event),
            LogFormat::Compact => self.log_compact(event),
        }
    }

    fn log_json(&self, event: &LogEvent) {
        if let Ok(json) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{}", json);
        }
    }

    fn log_pretty(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        match event {
            LogEvent::RunStarted {
                identity,
                output_dir,
                cached_ranges,
            } => {
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╭─────────────────────────────────────────────────────────────────────╮"
                        .bright_blue()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {}{}",
                    "│".bright_blue(),
                    "revmine".bold().bright_white(),
                    " ".repeat(60) + &"│".bright_blue().to_string()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Source:".dimmed(),
                    Self::truncate_with_padding(identity, 60, 68).dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Output:".dimmed(),
                    Self::truncate_with_padding(&output_dir.display().to_string(), 60, 68)
                        .dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}  {} {}",
                    "│".bright_blue(),
                    "Cached:".dimmed(),
                    Self::truncate_with_padding(&format!("{} chunk(s)", cached_ranges), 60, 68)
                        .dimmed()
                );
                let _ = writeln!(
                    stderr,
                    "{}",
                    "╰─────────────────────────────────────────────────────────────────────╯"
                        .bright_blue()
                );
                let _ = writeln!(stderr);
            }
            LogEvent::CommitSkipped { .. } => {
                // Too noisy for pretty mode; the run summary carries the count
            }
            LogEvent::CommitProcessed {
                revision,
                summary,
                files,
                records,
            } => {
                let marker = if *records > 0 {
                    "✓".bright_green()
                } else {
                    "·".dimmed()
                };
                let _ = writeln!(
                    stderr,
                    "  {} r{} {} {}",
                    marker,
                    revision,
                    Self::truncate(summary, 50),
                    format!("({} file(s), {} record(s))", files, records).dimmed()
                );
            }
            LogEvent::FileSkipped {
                revision,
                path,
                reason,
            } => {
                let _ = writeln!(
                    stderr,
                    "    {} r{} {}: {}",
                    "⚠".bright_yellow(),
                    revision,
                    path,
                    reason.dimmed()
                );
            }
            LogEvent::ChunkFlushed {
                low,
                high,
                records,
                path,
            } => {
                let _ = writeln!(
                    stderr,
                    "  {} {} r{}..r{} ({} record(s)) {}",
                    "▶".bright_cyan(),
                    "CHUNK".bright_cyan().bold(),
                    low,
                    high,
                    records,
                    path.display().to_string().dimmed()
                );
            }
            LogEvent::RunFinished { .. } => {
                // Printed by the caller as the final outcome
            }
            LogEvent::ErrorEncountered { revision, error } => {
                let location = revision.map(|r| format!(" at r{}", r)).unwrap_or_default();
                let _ = writeln!(stderr);
                let _ = writeln!(
                    stderr,
                    "{} Error{}: {}",
                    "✗".bright_red(),
                    location,
                    error.bright_red()
                );
            }
        }
    }

    fn log_compact(&self, event: &LogEvent) {
        let mut stderr = std::io::stderr();
        let timestamp = chrono::Utc::now().format("%H:%M:%S");
        let msg = match event {
            LogEvent::RunStarted {
                identity,
                cached_ranges,
                ..
            } => format!("[{}] run:start {} cached={}", timestamp, identity, cached_ranges),
            LogEvent::CommitSkipped { revision } => {
                format!("[{}] commit:skip:{}", timestamp, revision)
            }
            LogEvent::CommitProcessed {
                revision,
                files,
                records,
                ..
            } => format!(
                "[{}] commit:done:{} files={} records={}",
                timestamp, revision, files, records
            ),
            LogEvent::FileSkipped {
                revision,
                path,
                reason,
            } => format!("[{}] file:skip:{} {} {}", timestamp, revision, path, reason),
            LogEvent::ChunkFlushed {
                low, high, records, ..
            } => format!("[{}] chunk:{}-{} records={}", timestamp, low, high, records),
            LogEvent::RunFinished {
                status,
                commits,
                chunks,
                duration_secs,
                ..
            } => format!(
                "[{}] run:{} commits={} chunks={} {:.1}s",
                timestamp, status, commits, chunks, duration_secs
            ),
            LogEvent::ErrorEncountered { revision, error } => match revision {
                Some(r) => format!("[{}] error:{}:{}", timestamp, r, error),
                None => format!("[{}] error:{}", timestamp, error),
            },
        };
        let _ = writeln!(stderr, "{}", msg);
    }

    fn truncate(s: &str, max_chars: usize) -> String {
        if s.chars().count() > max_chars {
            let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
            format!("{}...", head)
        } else {
            s.to_string()
        }
    }

    /// Truncate a string and pad to exact width
    fn truncate_with_padding(s: &str, max_len: usize, total_width: usize) -> String {
        let truncated = Self::truncate(s, max_len);
        let padding_needed = total_width.saturating_sub(truncated.chars().count() + 1); // +1 for trailing │
        format!("{}{}│", truncated, " ".repeat(padding_needed))
    }
}
