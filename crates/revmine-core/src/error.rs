use thiserror::Error;

use revmine_segment::SegmentError;
use revmine_store::StoreError;
use revmine_vcs::VcsError;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Version control error: {0}")]
    Vcs(#[from] VcsError),

    #[error("Persistence error: {0}")]
    Store(#[from] StoreError),

    #[error("Segmentation error: {0}")]
    Segment(#[from] SegmentError),

    #[error("Configuration error: {0}")]
    Config(String),
}
