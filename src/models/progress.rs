use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Status messages emitted while a job runs.
///
/// They are meant for display only; the converter never reads them back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    Started { path: PathBuf },
    RowsConverted { rows: usize },
    RowFailed { row: usize, error: String },
    Completed { output: PathBuf },
    FileFailed { path: PathBuf, error: String },
    JobFinished { files: usize, failed: usize },
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::Started { path } => write!(f, "Converting: {}", path.display()),
            ProgressEvent::RowsConverted { rows } => write!(f, "{} rows converted", rows),
            ProgressEvent::RowFailed { row, error } => {
                write!(f, "Row {} failed to convert: {}", row, error)
            }
            ProgressEvent::Completed { output } => {
                write!(f, "Conversion complete, saved to: {}", output.display())
            }
            ProgressEvent::FileFailed { path, error } => {
                write!(f, "File {} failed to convert: {}", path.display(), error)
            }
            ProgressEvent::JobFinished { files, failed } => {
                write!(f, "Finished {} file(s), {} failed", files, failed)
            }
        }
    }
}

/// Receiver side of the progress channel
pub trait ProgressSink {
    fn emit(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent),
{
    fn emit(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Counters for one converted file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub encoding: String,
    pub rows_read: usize,
    pub rows_written: usize,
    pub rows_failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Converted(FileSummary),
    Failed { input: PathBuf, error: String },
}

/// Result of a whole job, one entry per input file in input order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobReport {
    pub files: Vec<FileOutcome>,
}

impl JobReport {
    pub fn failed_count(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f, FileOutcome::Failed { .. }))
            .count()
    }

    pub fn converted(&self) -> impl Iterator<Item = &FileSummary> {
        self.files.iter().filter_map(|f| match f {
            FileOutcome::Converted(summary) => Some(summary),
            FileOutcome::Failed { .. } => None,
        })
    }

    pub fn summary(&self) -> String {
        let rows_written: usize = self.converted().map(|s| s.rows_written).sum();
        let rows_failed: usize = self.converted().map(|s| s.rows_failed).sum();
        format!(
            "Files: {} converted, {} failed\nRows: {} written, {} skipped",
            self.files.len() - self.failed_count(),
            self.failed_count(),
            rows_written,
            rows_failed
        )
    }
}
