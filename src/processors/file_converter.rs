use crate::error::Result;
use crate::models::{ConversionRequest, FileSummary, ProgressEvent, ProgressSink};
use crate::processors::RowConverter;
use crate::readers::{detect_encoding, open_csv_reader, resolve_label, DetectedEncoding};
use crate::utils::constants::PROGRESS_INTERVAL;
use crate::utils::filename::result_file_path;
use crate::writers::ResultWriter;
use csv::StringRecord;
use std::path::Path;
use tracing::{debug, info, warn};

/// Converts one CSV file into its `_result` sibling, row by row
pub struct FileConverter {
    rows: RowConverter,
    encoding_label: Option<String>,
}

impl FileConverter {
    pub fn new(rows: RowConverter) -> Self {
        Self {
            rows,
            encoding_label: None,
        }
    }

    pub fn from_request(request: &ConversionRequest) -> Self {
        Self {
            rows: RowConverter::from_request(request),
            encoding_label: request.encoding.clone(),
        }
    }

    pub fn with_encoding(mut self, label: Option<String>) -> Self {
        self.encoding_label = label;
        self
    }

    fn resolve_encoding(&self, path: &Path) -> Result<DetectedEncoding> {
        match &self.encoding_label {
            Some(label) => resolve_label(label),
            None => detect_encoding(path),
        }
    }

    /// Convert `path`, reporting through `progress` when a sink is attached.
    ///
    /// Rows that fail to convert are reported and skipped. Only problems with
    /// the file itself (opening, decoding, writing) are returned as errors.
    pub fn convert_file(
        &self,
        path: &Path,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<FileSummary> {
        let emit = |event: ProgressEvent| {
            if let Some(sink) = progress {
                sink.emit(event);
            }
        };

        emit(ProgressEvent::Started {
            path: path.to_path_buf(),
        });

        let output = result_file_path(path);
        let encoding = self.resolve_encoding(path)?;
        info!(
            "Converting {} ({}) -> {}",
            path.display(),
            encoding.name(),
            output.display()
        );

        let mut reader = open_csv_reader(path, &encoding)?;
        let writer = ResultWriter::create(&output, &encoding)?;

        let mut summary = FileSummary {
            input: path.to_path_buf(),
            output: output.clone(),
            encoding: encoding.name().to_string(),
            rows_read: 0,
            rows_written: 0,
            rows_failed: 0,
        };

        let mut record = StringRecord::new();
        loop {
            let index = summary.rows_read;
            match reader.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) if e.is_row_level() => {
                    // Malformed record; the reader resumes at the next line
                    summary.rows_read += 1;
                    summary.rows_failed += 1;
                    warn!("Row {} of {} is not valid CSV: {}", index, path.display(), e);
                    emit(ProgressEvent::RowFailed {
                        row: index,
                        error: e.to_string(),
                    });
                    continue;
                }
                Err(e) => return Err(e),
            }
            summary.rows_read += 1;

            let row: Vec<String> = record.iter().map(str::to_string).collect();
            match self.write_row(&writer, index, &row) {
                Ok(()) => {
                    summary.rows_written += 1;
                    if index % PROGRESS_INTERVAL == 0 {
                        emit(ProgressEvent::RowsConverted { rows: index });
                    }
                }
                Err(e) if e.is_row_level() => {
                    summary.rows_failed += 1;
                    debug!("Row {} of {} skipped: {}", index, path.display(), e);
                    emit(ProgressEvent::RowFailed {
                        row: index,
                        error: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        emit(ProgressEvent::RowsConverted {
            rows: summary.rows_read,
        });
        emit(ProgressEvent::Completed {
            output: output.clone(),
        });
        info!(
            "Finished {}: {} rows written, {} skipped",
            path.display(),
            summary.rows_written,
            summary.rows_failed
        );

        Ok(summary)
    }

    fn write_row(&self, writer: &ResultWriter, index: usize, row: &[String]) -> Result<()> {
        let converted = self.rows.convert_row(index, row)?;
        writer.append_row(&converted)
    }
}

/// Convert a single file with the settings of `request`
pub fn convert_file(
    path: &Path,
    request: &ConversionRequest,
    progress: Option<&dyn ProgressSink>,
) -> Result<FileSummary> {
    FileConverter::from_request(request).convert_file(path, progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionError;
    use crate::models::{CoordinateSystem, OutputSystems, Separator};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_input(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn run(converter: &FileConverter, path: &Path) -> (FileSummary, Vec<ProgressEvent>) {
        let events = RefCell::new(Vec::new());
        let sink = |event: ProgressEvent| events.borrow_mut().push(event);
        let summary = converter.convert_file(path, Some(&sink)).unwrap();
        (summary, events.into_inner())
    }

    fn wgs_to_wgs() -> RowConverter {
        RowConverter::new(
            CoordinateSystem::Wgs84,
            OutputSystems::new().with(CoordinateSystem::Wgs84),
        )
    }

    #[test]
    fn test_convert_with_header() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "points.csv", "name,lon,lat\na,116.3,39.9\nb,121.5,31.2\n");
        let converter = FileConverter::new(wgs_to_wgs().with_header(true).with_columns(1, 2));

        let (summary, events) = run(&converter, &input);

        let output = std::fs::read_to_string(dir.path().join("points_result.csv")).unwrap();
        assert_eq!(
            output,
            "name,lon,lat,wgs84_x,wgs84_y\na,116.3,39.9,116.3,39.9\nb,121.5,31.2,121.5,31.2\n"
        );
        assert_eq!(summary.rows_written, 3);
        assert_eq!(
            events,
            vec![
                ProgressEvent::Started { path: input.clone() },
                ProgressEvent::RowsConverted { rows: 0 },
                ProgressEvent::RowsConverted { rows: 3 },
                ProgressEvent::Completed {
                    output: dir.path().join("points_result.csv")
                },
            ]
        );
    }

    #[test]
    fn test_bad_row_is_skipped() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "points.csv", "116.3,39.9\n116.4\n116.5,40.0\n");
        let converter = FileConverter::new(wgs_to_wgs());

        let (summary, events) = run(&converter, &input);

        let output = std::fs::read_to_string(dir.path().join("points_result.csv")).unwrap();
        assert_eq!(output, "116.3,39.9,116.3,39.9\n116.5,40.0,116.5,40.0\n");
        assert_eq!(summary.rows_failed, 1);

        let failures: Vec<&ProgressEvent> = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::RowFailed { .. }))
            .collect();
        assert_eq!(failures.len(), 1);
        assert!(matches!(failures[0], ProgressEvent::RowFailed { row: 1, .. }));
    }

    #[test]
    fn test_same_column_input() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "pairs.csv", "id,lonlat\n1,116.3|39.9\n");
        let converter = FileConverter::new(
            RowConverter::new(
                CoordinateSystem::Bd09,
                OutputSystems::new().with(CoordinateSystem::Bd09),
            )
            .with_header(true)
            .with_same_column(1, Separator::Pipe),
        );

        run(&converter, &input);

        let output = std::fs::read_to_string(dir.path().join("pairs_result.csv")).unwrap();
        assert_eq!(output, "id,lonlat,bd09_x,bd09_y\n1,116.3|39.9,116.3,39.9\n");
    }

    #[test]
    fn test_empty_file() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "empty.csv", "");
        let converter = FileConverter::new(wgs_to_wgs().with_header(true));

        let (summary, events) = run(&converter, &input);

        assert_eq!(summary.rows_read, 0);
        assert_eq!(events.len(), 3);
        assert_eq!(events[1], ProgressEvent::RowsConverted { rows: 0 });
        assert!(matches!(events[2], ProgressEvent::Completed { .. }));
        assert_eq!(
            std::fs::read(dir.path().join("empty_result.csv")).unwrap().len(),
            0
        );
    }

    #[test]
    fn test_header_only_file() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "header.csv", "lon,lat\n");
        let converter = FileConverter::new(wgs_to_wgs().with_header(true));

        let (summary, events) = run(&converter, &input);

        assert_eq!(summary.rows_written, 1);
        assert_eq!(
            &events[1..3],
            &[
                ProgressEvent::RowsConverted { rows: 0 },
                ProgressEvent::RowsConverted { rows: 1 },
            ]
        );
        let output = std::fs::read_to_string(dir.path().join("header_result.csv")).unwrap();
        assert_eq!(output, "lon,lat,wgs84_x,wgs84_y\n");
    }

    #[test]
    fn test_blank_line_is_a_failed_row() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "gaps.csv", "116.3,39.9\n\n116.4,39.8\nbad\n");
        let converter = FileConverter::new(wgs_to_wgs());

        let (summary, events) = run(&converter, &input);

        assert_eq!(summary.rows_read, 4);
        assert_eq!(summary.rows_written, 2);
        assert_eq!(summary.rows_failed, 2);

        let failed_rows: Vec<usize> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::RowFailed { row, .. } => Some(*row),
                _ => None,
            })
            .collect();
        assert_eq!(failed_rows, vec![1, 3]);
        assert!(events.contains(&ProgressEvent::RowsConverted { rows: 4 }));

        let output = std::fs::read_to_string(dir.path().join("gaps_result.csv")).unwrap();
        assert_eq!(output, "116.3,39.9,116.3,39.9\n116.4,39.8,116.4,39.8\n");
    }

    #[test]
    fn test_blank_lines_only_file() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "blank.csv", "\n\n");
        let converter = FileConverter::new(wgs_to_wgs());

        let (summary, events) = run(&converter, &input);

        assert_eq!(summary.rows_read, 2);
        assert_eq!(summary.rows_written, 0);
        assert!(matches!(events[0], ProgressEvent::Started { .. }));
        assert!(matches!(events[1], ProgressEvent::RowFailed { row: 0, .. }));
        assert!(matches!(events[2], ProgressEvent::RowFailed { row: 1, .. }));
        assert_eq!(events[3], ProgressEvent::RowsConverted { rows: 2 });
        assert!(matches!(events[4], ProgressEvent::Completed { .. }));
        assert_eq!(events.len(), 5);
        assert_eq!(
            std::fs::read(dir.path().join("blank_result.csv")).unwrap().len(),
            0
        );
    }

    #[test]
    fn test_malformed_bytes_after_sample_fail_the_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("late.csv");
        let mut bytes = "116.3,39.9\n".repeat(50).into_bytes();
        bytes.extend_from_slice(b"\xFFbad,116.3,39.9\n");
        std::fs::write(&input, &bytes).unwrap();

        let converter = FileConverter::new(wgs_to_wgs());
        let events = RefCell::new(Vec::new());
        let sink = |event: ProgressEvent| events.borrow_mut().push(event);
        let err = converter.convert_file(&input, Some(&sink)).unwrap_err();

        assert!(matches!(err, ConversionError::Io(_)));
        assert!(err.to_string().contains("at byte 550"));
        let events = events.into_inner();
        assert!(!events
            .iter()
            .any(|e| matches!(e, ProgressEvent::Completed { .. })));

        // Rows before the bad bytes were converted; nothing after them was
        let output = std::fs::read_to_string(dir.path().join("late_result.csv")).unwrap();
        assert_eq!(output.lines().count(), 50);
        assert!(!output.contains('\u{FFFD}'));
    }

    #[test]
    fn test_no_sink_converts_the_same() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "quiet.csv", "116.3,39.9\nbad\n");
        let converter = FileConverter::new(wgs_to_wgs());

        let summary = converter.convert_file(&input, None).unwrap();

        assert_eq!(summary.rows_written, 1);
        assert_eq!(summary.rows_failed, 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let converter = FileConverter::new(wgs_to_wgs());
        assert!(converter
            .convert_file(&dir.path().join("missing.csv"), None)
            .is_err());
    }

    #[test]
    fn test_unknown_encoding_label() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "points.csv", "116.3,39.9\n");
        let converter = FileConverter::new(wgs_to_wgs()).with_encoding(Some("martian".to_string()));

        assert!(matches!(
            converter.convert_file(&input, None),
            Err(ConversionError::UnsupportedEncoding(_))
        ));
    }
}
