pub mod decoding_reader;
pub mod encoding;
pub mod preview;
pub mod record_reader;

pub use decoding_reader::DecodingReader;
pub use encoding::{detect_encoding, resolve_label, DetectedEncoding};
pub use preview::{preview_csv, CsvPreview};
pub use record_reader::{RecordReader, Records};

use crate::error::Result;
use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub type CsvFileReader = RecordReader<BufReader<DecodingReader<File>>>;

/// Open a CSV file for record-by-record reading in the given encoding.
///
/// No row is treated as a header, rows may have differing lengths and blank
/// lines come back as empty records.
pub fn open_csv_reader(path: &Path, encoding: &DetectedEncoding) -> Result<CsvFileReader> {
    let file = File::open(path)?;
    let decoded = DecodingReader::new(file, encoding.decoder());
    Ok(RecordReader::new(BufReader::with_capacity(
        DEFAULT_BUFFER_SIZE,
        decoded,
    )))
}
