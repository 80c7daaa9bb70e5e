use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use revmine_logging::{LogEvent, Logger};
use revmine_segment::{DiffStat, Segmenter};
use revmine_store::{CacheIndex, OutputBatcher, StoreError};
use revmine_vcs::{Commit, RevisionSource, Revision, VcsError, VcsProvider};

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::format::RecordFormatter;
use crate::location::output_dir;
use crate::outcome::{ExtractionOutcome, RunCounts};

/// How the commit loop ended
enum LoopEnd {
    Exhausted,
    LimitReached,
    Interrupted,
    Failed(VcsError),
}

/// Records produced by one commit
struct CommitRecords {
    files: usize,
    records: Vec<String>,
}

/// Walks the history of one repository and persists diff blocks as chunks
pub struct Extractor<'a> {
    provider: &'a dyn VcsProvider,
    config: ExtractConfig,
    formatter: RecordFormatter,
    logger: Arc<Logger>,
    interrupted: Arc<AtomicBool>,
}

impl<'a> Extractor<'a> {
    pub fn new(provider: &'a dyn VcsProvider, config: ExtractConfig, logger: Arc<Logger>) -> Self {
        Self {
            provider,
            config,
            formatter: RecordFormatter::new(),
            logger,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a handle to signal interruption
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Output directory derived from the repository identity
    pub fn output_dir(&self) -> Result<PathBuf, ExtractError> {
        let identity = self.provider.repository_identity()?;
        Ok(output_dir(&self.config.output_root, &identity))
    }

    /// Run the extraction until the history is exhausted, the scan limit is
    /// reached, the run is interrupted or the backend fails.
    ///
    /// Persistence failures are returned as errors; backend failures end the
    /// run with [`ExtractionOutcome::Failed`] after flushing what was handled.
    pub fn run(&self) -> Result<ExtractionOutcome, ExtractError> {
        self.config.validate()?;
        let started = Instant::now();
        let segmenter = self.config.segmenter()?;
        let mut counts = RunCounts::default();

        let identity = match self.provider.repository_identity() {
            Ok(identity) => identity,
            Err(e) => return Ok(self.fail(counts, None, e, started)),
        };
        let dir = output_dir(&self.config.output_root, &identity);
        let extension = self.config.chunk_extension();

        let mut index = CacheIndex::load(&dir, extension)?;
        let mut batcher =
            OutputBatcher::new(dir.clone(), self.config.threshold).with_extension(extension);

        info!(
            provider = self.provider.name(),
            identity = %identity,
            output = %dir.display(),
            cached = index.len(),
            "Starting extraction"
        );
        self.logger.log(&LogEvent::RunStarted {
            identity,
            output_dir: dir,
            cached_ranges: index.len(),
        });

        let mut source = RevisionSource::new(self.provider, self.config.scan_options());
        let mut last_revision: Option<Revision> = None;

        let end = loop {
            if self.interrupted.load(Ordering::SeqCst) {
                info!("Extraction interrupted by user");
                break LoopEnd::Interrupted;
            }

            let commit = match source.next() {
                Some(Ok(commit)) => commit,
                Some(Err(e)) => break LoopEnd::Failed(e),
                None if source.hit_limit() => break LoopEnd::LimitReached,
                None => break LoopEnd::Exhausted,
            };
            counts.commits += 1;

            if index.is_processed(commit.revision) {
                // Close the pending chunk so it cannot span the cached range
                self.flush(&mut batcher, &mut index, &mut counts, true)?;
                counts.skipped += 1;
                last_revision = Some(commit.revision);
                debug!(revision = commit.revision, "Revision already cached");
                self.logger.log(&LogEvent::CommitSkipped {
                    revision: commit.revision,
                });
                continue;
            }

            let produced = match self.process_commit(&commit, &segmenter) {
                Ok(produced) => produced,
                Err(e) => {
                    last_revision = Some(commit.revision);
                    break LoopEnd::Failed(e);
                }
            };

            let record_count = produced.records.len();
            batcher.note_revision(commit.revision);
            for record in produced.records {
                batcher.append(record, commit.revision);
            }
            counts.processed += 1;
            counts.records += record_count;
            last_revision = Some(commit.revision);

            self.logger.log(&LogEvent::CommitProcessed {
                revision: commit.revision,
                summary: commit.summary().to_string(),
                files: produced.files,
                records: record_count,
            });

            self.flush(&mut batcher, &mut index, &mut counts, false)?;
        };

        self.flush(&mut batcher, &mut index, &mut counts, true)?;

        let outcome = match end {
            LoopEnd::Exhausted => ExtractionOutcome::completed(counts, started.elapsed()),
            LoopEnd::LimitReached => ExtractionOutcome::limit_reached(counts, started.elapsed()),
            LoopEnd::Interrupted => {
                ExtractionOutcome::interrupted(counts, last_revision, started.elapsed())
            }
            LoopEnd::Failed(e) => self.fail(counts, last_revision, e, started),
        };

        info!(
            status = outcome.status(),
            commits = counts.commits,
            skipped = counts.skipped,
            records = counts.records,
            chunks = counts.chunks,
            "Extraction finished"
        );
        self.logger.log(&LogEvent::RunFinished {
            status: outcome.status().to_string(),
            commits: counts.commits,
            processed: counts.processed,
            skipped: counts.skipped,
            records: counts.records,
            chunks: counts.chunks,
            duration_secs: outcome.duration_secs(),
        });

        Ok(outcome)
    }

    /// Fetch, segment and format every eligible change of one commit.
    ///
    /// Files whose diff cannot be segmented are skipped; backend errors abort
    /// the commit so none of its records reach the batcher.
    fn process_commit(
        &self,
        commit: &Commit,
        segmenter: &Segmenter,
    ) -> Result<CommitRecords, VcsError> {
        let mut produced = CommitRecords {
            files: 0,
            records: Vec::new(),
        };

        for change in commit.changes.iter().filter(|c| c.is_modified()) {
            let Some(extension) = change.extension() else {
                continue;
            };
            if !self.config.is_allowed(&extension) {
                continue;
            }
            produced.files += 1;

            let diff =
                self.provider
                    .diff(commit.revision, &change.path, self.config.diff_context_lines)?;

            let stat = DiffStat::from_diff(&diff);
            debug!(
                revision = commit.revision,
                path = %change.path,
                added = stat.added,
                removed = stat.removed,
                "Fetched diff"
            );

            let blocks = match segmenter.segment(&diff) {
                Ok(blocks) => blocks,
                Err(e) => {
                    warn!(revision = commit.revision, path = %change.path, error = %e, "Skipping file");
                    self.logger.log(&LogEvent::FileSkipped {
                        revision: commit.revision,
                        path: change.path.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let language = self.config.language_for(&extension);
            if let Some(record) =
                self.formatter
                    .format_change(commit, &change.path, language, &blocks)
            {
                produced.records.push(record);
            }
        }

        Ok(produced)
    }

    /// Flush the pending chunk, unconditionally when `force` is set
    fn flush(
        &self,
        batcher: &mut OutputBatcher,
        index: &mut CacheIndex,
        counts: &mut RunCounts,
        force: bool,
    ) -> Result<(), StoreError> {
        let range = batcher.pending().range();
        let records = batcher.pending().len();

        let written = if force {
            batcher.flush(index)?
        } else {
            batcher.flush_if_threshold_exceeded(index)?
        };

        if let (Some(path), Some(range)) = (written, range) {
            counts.chunks += 1;
            self.logger.log(&LogEvent::ChunkFlushed {
                low: range.low,
                high: range.high,
                records,
                path,
            });
        }
        Ok(())
    }

    fn fail(
        &self,
        counts: RunCounts,
        revision: Option<Revision>,
        error: VcsError,
        started: Instant,
    ) -> ExtractionOutcome {
        warn!(error = %error, "Backend failure");
        self.logger.log(&LogEvent::ErrorEncountered {
            revision,
            error: error.to_string(),
        });
        ExtractionOutcome::failed(counts, error.to_string(), started.elapsed())
    }
}
