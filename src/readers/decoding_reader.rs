use crate::utils::constants::DEFAULT_BUFFER_SIZE;
use encoding_rs::{Decoder, DecoderResult};
use std::io::{self, Read};

/// `Read` adapter that transcodes any supported encoding to UTF-8 on the fly,
/// so large CSV files never have to be held in memory.
pub struct DecodingReader<R> {
    inner: R,
    decoder: Decoder,
    input: Vec<u8>,
    input_start: usize,
    input_end: usize,
    output: Vec<u8>,
    output_start: usize,
    output_end: usize,
    consumed: u64,
    malformed: Option<io::Error>,
    eof: bool,
    finished: bool,
}

impl<R: Read> DecodingReader<R> {
    pub fn new(inner: R, decoder: Decoder) -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE, inner, decoder)
    }

    pub fn with_capacity(capacity: usize, inner: R, decoder: Decoder) -> Self {
        // Room for at least one fully expanded character
        let capacity = capacity.max(16);
        Self {
            inner,
            decoder,
            input: vec![0; capacity],
            input_start: 0,
            input_end: 0,
            output: vec![0; capacity * 3],
            output_start: 0,
            output_end: 0,
            consumed: 0,
            malformed: None,
            eof: false,
            finished: false,
        }
    }

    /// Text decoded before a malformed sequence is still handed out; the
    /// error is returned once that text has been read.
    fn fill_output(&mut self) -> io::Result<()> {
        if self.input_start == self.input_end && !self.eof {
            let n = self.inner.read(&mut self.input)?;
            self.consumed += self.input_end as u64;
            self.input_start = 0;
            self.input_end = n;
            self.eof = n == 0;
        }

        let last = self.eof;
        let (result, read, written) = self.decoder.decode_to_utf8_without_replacement(
            &self.input[self.input_start..self.input_end],
            &mut self.output,
            last,
        );
        self.input_start += read;
        self.output_start = 0;
        self.output_end = written;

        match result {
            DecoderResult::InputEmpty if last => self.finished = true,
            DecoderResult::Malformed(bad, after) => {
                self.finished = true;
                let offset =
                    self.consumed + self.input_start as u64 - u64::from(bad) - u64::from(after);
                self.malformed = Some(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "input is not valid {} at byte {}",
                        self.decoder.encoding().name(),
                        offset
                    ),
                ));
            }
            _ => {}
        }
        Ok(())
    }
}

impl<R: Read> Read for DecodingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            if self.output_start < self.output_end {
                let n = buf.len().min(self.output_end - self.output_start);
                buf[..n].copy_from_slice(&self.output[self.output_start..self.output_start + n]);
                self.output_start += n;
                return Ok(n);
            }
            if let Some(err) = self.malformed.take() {
                return Err(err);
            }
            if self.finished {
                return Ok(0);
            }
            self.fill_output()?;
        }
    }
}
