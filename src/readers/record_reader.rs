use crate::error::Result;
use csv::{ReaderBuilder, StringRecord};
use std::io::BufRead;

/// Reads CSV records one logical line at a time.
///
/// Unlike `csv::Reader`, blank lines are not skipped: each comes back as an
/// empty record, so the n-th record is always the n-th line of the file
/// (quoted fields spanning lines aside).
pub struct RecordReader<R> {
    inner: R,
    parser: ReaderBuilder,
    line: String,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        let mut parser = ReaderBuilder::new();
        parser.has_headers(false).flexible(true);
        Self {
            inner,
            parser,
            line: String::new(),
        }
    }

    /// Read the next record into `record`. Returns `Ok(false)` at end of input.
    ///
    /// I/O and decoding failures come back as `ConversionError::Io`, a bad
    /// record as `ConversionError::Csv`; the reader stays usable after the
    /// latter.
    pub fn read_record(&mut self, record: &mut StringRecord) -> Result<bool> {
        self.line.clear();
        record.clear();

        let mut quotes = QuoteState::default();
        loop {
            let start = self.line.len();
            if self.inner.read_line(&mut self.line)? == 0 {
                break;
            }
            quotes.scan(&self.line[start..]);
            if !quotes.in_quotes {
                break;
            }
        }

        if self.line.is_empty() {
            return Ok(false);
        }

        let text = self.line.trim_end_matches(|c: char| c == '\r' || c == '\n');
        if !text.is_empty() {
            self.parser
                .from_reader(text.as_bytes())
                .read_record(record)?;
        }
        Ok(true)
    }

    pub fn records(self) -> Records<R> {
        Records { reader: self }
    }
}

/// Iterator over the records of a `RecordReader`
pub struct Records<R> {
    reader: RecordReader<R>,
}

impl<R: BufRead> Iterator for Records<R> {
    type Item = Result<StringRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = StringRecord::new();
        match self.reader.read_record(&mut record) {
            Ok(true) => Some(Ok(record)),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Tracks whether a line ends inside a quoted field.
///
/// A quote only opens a field at its first character, as in `csv`; doubled
/// quotes inside a quoted field are escapes.
#[derive(Debug, Default)]
struct QuoteState {
    in_quotes: bool,
    mid_field: bool,
    pending_quote: bool,
}

impl QuoteState {
    fn scan(&mut self, text: &str) {
        for c in text.chars() {
            if self.pending_quote {
                self.pending_quote = false;
                if c == '"' {
                    continue;
                }
                self.in_quotes = false;
            }
            if self.in_quotes {
                if c == '"' {
                    self.pending_quote = true;
                }
                continue;
            }
            match c {
                '"' if !self.mid_field => {
                    self.in_quotes = true;
                    self.mid_field = true;
                }
                ',' | '\r' | '\n' => self.mid_field = false,
                _ => self.mid_field = true,
            }
        }
    }
}
