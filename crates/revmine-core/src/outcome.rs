use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters accumulated over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    /// Commits delivered by the revision source
    pub commits: usize,
    /// Commits skipped because a chunk already covers them
    pub skipped: usize,
    /// Commits whose changes were examined
    pub processed: usize,
    /// Records appended to chunks
    pub records: usize,
    /// Chunk files written
    pub chunks: usize,
}

/// The final outcome of an extraction run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionOutcome {
    /// The history was exhausted
    Completed {
        #[serde(flatten)]
        counts: RunCounts,
        total_duration_secs: f64,
    },
    /// The scan limit was reached before the history ran out
    LimitReached {
        #[serde(flatten)]
        counts: RunCounts,
        total_duration_secs: f64,
    },
    /// User requested stop (e.g., Ctrl+C)
    Interrupted {
        #[serde(flatten)]
        counts: RunCounts,
        last_revision: Option<u64>,
        total_duration_secs: f64,
    },
    /// The backend failed; everything before the failure is persisted
    Failed {
        #[serde(flatten)]
        counts: RunCounts,
        error: String,
        total_duration_secs: f64,
    },
}

impl ExtractionOutcome {
    pub fn completed(counts: RunCounts, duration: Duration) -> Self {
        Self::Completed {
            counts,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn limit_reached(counts: RunCounts, duration: Duration) -> Self {
        Self::LimitReached {
            counts,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn interrupted(counts: RunCounts, last_revision: Option<u64>, duration: Duration) -> Self {
        Self::Interrupted {
            counts,
            last_revision,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn failed(counts: RunCounts, error: String, duration: Duration) -> Self {
        Self::Failed {
            counts,
            error,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn counts(&self) -> &RunCounts {
        match self {
            Self::Completed { counts, .. }
            | Self::LimitReached { counts, .. }
            | Self::Interrupted { counts, .. }
            | Self::Failed { counts, .. } => counts,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        match self {
            Self::Completed {
                total_duration_secs,
                ..
            }
            | Self::LimitReached {
                total_duration_secs,
                ..
            }
            | Self::Interrupted {
                total_duration_secs,
                ..
            }
            | Self::Failed {
                total_duration_secs,
                ..
            } => *total_duration_secs,
        }
    }

    /// Short status label, as used in serialized output
    pub fn status(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "completed",
            Self::LimitReached { .. } => "limit_reached",
            Self::Interrupted { .. } => "interrupted",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::LimitReached { .. })
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed { .. } | Self::LimitReached { .. } => 0,
            Self::Interrupted { .. } => 130,
            Self::Failed { .. } => 2,
        }
    }
}
