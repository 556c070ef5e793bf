//! Multi-filing runner.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use filings_core::{FilingError, FilingSource, ReceiptDates, Result, StatementMatrix};
use filings_xbrl::{FilingHints, XbrlEngine};

/// Maximum number of error messages kept in a [`BatchReport`].
pub const MAX_REPORTED_ERRORS: usize = 10;

/// Batch runner settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Directory output files are written under.
    pub output_dir: PathBuf,
    /// Write into `year=YYYY/mm=MM/` partitions.
    pub partitioned: bool,
    /// Filings processed at the same time.
    pub max_concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            partitioned: false,
            max_concurrency: 4,
        }
    }
}

impl BatchConfig {
    /// Settings writing into `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Enable or disable partitioned output.
    #[must_use]
    pub const fn with_partitioned(mut self, partitioned: bool) -> Self {
        self.partitioned = partitioned;
        self
    }

    /// Set the concurrency limit.
    #[must_use]
    pub const fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }
}

/// One filing to process.
#[derive(Clone, Debug)]
pub struct FilingJob {
    source: Arc<dyn FilingSource>,
    hints: FilingHints,
}

impl FilingJob {
    /// Job for a parsed filing.
    pub fn new(source: impl FilingSource + 'static) -> Self {
        Self {
            source: Arc::new(source),
            hints: FilingHints::default(),
        }
    }

    /// Job for a matrix stored as JSON.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(StatementMatrix::from_json_file(path)?))
    }

    /// Attach title and receipt-date hints.
    #[must_use]
    pub fn with_hints(mut self, hints: FilingHints) -> Self {
        self.hints = hints;
        self
    }

    fn label(&self) -> String {
        self.source
            .filename()
            .unwrap_or_else(|_| "<unknown>".to_string())
    }
}

/// Summary of a batch run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Filings attempted.
    pub filings_processed: usize,
    /// Output files written.
    pub files_generated: usize,
    /// Filings that produced no records.
    pub no_data: usize,
    /// First errors, as `"{filing}: {error}"`.
    pub errors: Vec<String>,
    /// Number of failed filings, including those past [`MAX_REPORTED_ERRORS`].
    pub failed: usize,
    /// Paths of written files.
    pub outputs: Vec<PathBuf>,
}

impl BatchReport {
    fn record(&mut self, label: &str, outcome: Result<PathBuf>) {
        self.filings_processed += 1;
        match outcome {
            Ok(path) => {
                self.files_generated += 1;
                self.outputs.push(path);
            }
            Err(e) if e.is_no_data() => {
                debug!(filing = label, "No data produced");
                self.no_data += 1;
            }
            Err(e) => {
                warn!(filing = label, error = %e, "Filing failed");
                self.failed += 1;
                if self.errors.len() < MAX_REPORTED_ERRORS {
                    self.errors.push(format!("{label}: {e}"));
                }
            }
        }
    }
}

/// Processes many filings concurrently.
///
/// Each filing runs on its own blocking worker and owns its record set. A failure
/// in one filing is counted in the report and never affects the others.
#[derive(Clone, Debug)]
pub struct FilingBatch {
    engine: XbrlEngine,
    receipts: Arc<ReceiptDates>,
    config: BatchConfig,
}

impl FilingBatch {
    /// Create a batch runner.
    #[must_use]
    pub fn new(engine: XbrlEngine, config: BatchConfig) -> Self {
        Self {
            engine,
            receipts: Arc::new(ReceiptDates::new()),
            config,
        }
    }

    /// Use a receipt-date side channel populated ahead of the run.
    #[must_use]
    pub fn with_receipts(mut self, receipts: ReceiptDates) -> Self {
        self.receipts = Arc::new(receipts);
        self
    }

    /// Batch settings.
    #[must_use]
    pub const fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Process every job and write one file per filing with records.
    #[instrument(skip_all, fields(jobs = jobs.len()))]
    pub async fn run(&self, jobs: Vec<FilingJob>) -> BatchReport {
        let concurrency = self.config.max_concurrency.max(1);

        let outcomes: Vec<(String, Result<PathBuf>)> = stream::iter(jobs)
            .map(|job| {
                let engine = self.engine.clone();
                let receipts = Arc::clone(&self.receipts);
                let config = self.config.clone();
                async move {
                    let label = job.label();
                    let outcome = tokio::task::spawn_blocking(move || {
                        process_one(&engine, &job, &receipts, &config)
                    })
                    .await
                    .map_err(|e| FilingError::Other(e.to_string()))
                    .and_then(|outcome| outcome);
                    (label, outcome)
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let mut report = BatchReport::default();
        for (label, outcome) in outcomes {
            report.record(&label, outcome);
        }
        info!(
            processed = report.filings_processed,
            files = report.files_generated,
            no_data = report.no_data,
            failed = report.failed,
            "Batch complete"
        );
        report
    }
}

fn process_one(
    engine: &XbrlEngine,
    job: &FilingJob,
    receipts: &ReceiptDates,
    config: &BatchConfig,
) -> Result<PathBuf> {
    let output = engine.process(job.source.as_ref(), &job.hints, receipts)?;
    if config.partitioned {
        output.write_partitioned(&config.output_dir)
    } else {
        output.write(&config.output_dir)
    }
}
