use crate::error::{ConversionError, Result};
use crate::readers::DetectedEncoding;
use encoding_rs::Encoding;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends CSV rows to a result file, one open-write-close cycle per row,
/// so everything written before a crash stays on disk.
pub struct ResultWriter {
    path: PathBuf,
    encoding: &'static Encoding,
}

impl ResultWriter {
    /// Create the output file (if missing) and write the encoding preamble
    /// when the file is still empty. Existing content is never truncated.
    pub fn create(path: &Path, encoding: &DetectedEncoding) -> Result<Self> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let preamble = encoding.output_preamble();
        if !preamble.is_empty() && file.metadata()?.len() == 0 {
            file.write_all(preamble)?;
        }

        Ok(Self {
            path: path.to_path_buf(),
            encoding: encoding.output_encoding(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append_row(&self, row: &[String]) -> Result<()> {
        let bytes = self.encode_row(row)?;
        let mut file = OpenOptions::new().append(true).open(&self.path)?;
        file.write_all(&bytes)?;
        Ok(())
    }

    /// CSV-serialize a row with a `\n` terminator in the output encoding
    fn encode_row(&self, row: &[String]) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(row)?;
        let line = writer
            .into_inner()
            .map_err(|e| ConversionError::Io(e.into_error()))?;
        let line = String::from_utf8(line)
            .map_err(|e| ConversionError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

        let (encoded, _, had_unmappable) = self.encoding.encode(&line);
        if had_unmappable {
            return Err(ConversionError::Unencodable {
                encoding: self.encoding.name(),
            });
        }
        Ok(encoded.into_owned())
    }
}
