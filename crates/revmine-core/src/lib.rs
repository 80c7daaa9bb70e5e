mod config;
mod error;
mod extractor;
mod format;
mod location;
mod outcome;

pub use config::{ExtractConfig, DEFAULT_OUTPUT_SUBDIR};
pub use error::ExtractError;
pub use extractor::Extractor;
pub use format::RecordFormatter;
pub use location::{output_dir, output_dir_name};
pub use outcome::{ExtractionOutcome, RunCounts};
