use crate::error::{ConversionError, Result};
use crate::models::{ConversionRequest, FileOutcome, JobReport, ProgressEvent, ProgressSink};
use crate::processors::FileConverter;
use crate::utils::filename::existing_results;
use std::path::PathBuf;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use validator::Validate;

/// Runs a conversion request over all of its input files, one after another
pub struct JobRunner {
    request: ConversionRequest,
}

impl JobRunner {
    /// Validate `request` and drop repeated input files, which would
    /// otherwise be appended to the same result twice
    pub fn new(mut request: ConversionRequest) -> Result<Self> {
        request.validate()?;
        for path in request.dedup_inputs() {
            warn!("{} is already in this job, skipping it", path.display());
        }
        Ok(Self { request })
    }

    pub fn request(&self) -> &ConversionRequest {
        &self.request
    }

    /// Convert every input file. A failing file is reported and skipped;
    /// `JobFinished` is emitted exactly once at the end.
    pub fn run(&self, progress: Option<&dyn ProgressSink>) -> JobReport {
        let converter = FileConverter::from_request(&self.request);
        let mut report = JobReport::default();

        for path in &self.request.input_paths {
            match converter.convert_file(path, progress) {
                Ok(summary) => report.files.push(FileOutcome::Converted(summary)),
                Err(e) => {
                    warn!("Failed to convert {}: {}", path.display(), e);
                    if let Some(sink) = progress {
                        sink.emit(ProgressEvent::FileFailed {
                            path: path.clone(),
                            error: e.to_string(),
                        });
                    }
                    report.files.push(FileOutcome::Failed {
                        input: path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let failed = report.failed_count();
        info!(
            "Job finished: {} file(s), {} failed",
            report.files.len(),
            failed
        );
        if let Some(sink) = progress {
            sink.emit(ProgressEvent::JobFinished {
                files: report.files.len(),
                failed,
            });
        }

        report
    }

    /// Run the job on a blocking worker thread.
    ///
    /// Progress events arrive on the returned receiver in emission order; the
    /// worker never waits for the receiver. Must be called inside a Tokio
    /// runtime.
    pub fn spawn(self) -> (JoinHandle<JobReport>, UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = unbounded_channel();
        let handle = tokio::task::spawn_blocking(move || {
            let sink = move |event: ProgressEvent| {
                // Nobody listening is not an error for the worker
                let _ = tx.send(event);
            };
            self.run(Some(&sink))
        });
        (handle, rx)
    }
}

/// Make sure no earlier result file gets appended to.
///
/// Without `overwrite` an existing result aborts the job before it starts;
/// with it, existing results are deleted. Returns the deleted paths.
pub fn prepare_outputs(inputs: &[PathBuf], overwrite: bool) -> Result<Vec<PathBuf>> {
    let existing = existing_results(inputs);
    if existing.is_empty() {
        return Ok(existing);
    }
    if !overwrite {
        return Err(ConversionError::OutputExists(existing[0].clone()));
    }
    for path in &existing {
        std::fs::remove_file(path)?;
        info!("Removed previous result {}", path.display());
    }
    Ok(existing)
}
