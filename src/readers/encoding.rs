use crate::error::{ConversionError, Result};
use crate::utils::constants::ENCODING_SAMPLE_SIZE;
use encoding_rs::{Decoder, DecoderResult, Encoding, GB18030, GBK, UTF_8, WINDOWS_1252};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Text encoding chosen for one input file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedEncoding {
    pub encoding: &'static Encoding,
    pub has_bom: bool,
}

impl DetectedEncoding {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            encoding: upgrade_legacy_chinese(encoding),
            has_bom: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Encoding used when writing; UTF-16 inputs are written as UTF-8
    pub fn output_encoding(&self) -> &'static Encoding {
        self.encoding.output_encoding()
    }

    /// Decoder that strips a leading BOM if one is present
    pub fn decoder(&self) -> Decoder {
        self.encoding.new_decoder()
    }

    /// Bytes to put in front of a fresh output file
    pub fn output_preamble(&self) -> &'static [u8] {
        if self.has_bom && self.output_encoding() == UTF_8 {
            b"\xEF\xBB\xBF"
        } else {
            b""
        }
    }
}

/// Guess the encoding of a file from its first bytes
pub fn detect_encoding(path: &Path) -> Result<DetectedEncoding> {
    let file = File::open(path)?;
    let mut sample = Vec::with_capacity(ENCODING_SAMPLE_SIZE);
    file.take(ENCODING_SAMPLE_SIZE as u64).read_to_end(&mut sample)?;
    Ok(detect_from_bytes(&sample))
}

pub fn detect_from_bytes(sample: &[u8]) -> DetectedEncoding {
    if let Some((encoding, _bom_len)) = Encoding::for_bom(sample) {
        return DetectedEncoding {
            encoding,
            has_bom: true,
        };
    }

    match std::str::from_utf8(sample) {
        Ok(_) => return DetectedEncoding::new(UTF_8),
        // Sequence cut off by the sample boundary
        Err(e) if e.error_len().is_none() => return DetectedEncoding::new(UTF_8),
        Err(_) => {}
    }

    if decodes_cleanly(GB18030, sample) {
        DetectedEncoding::new(GB18030)
    } else {
        DetectedEncoding::new(WINDOWS_1252)
    }
}

/// Resolve a user supplied label such as "gbk" or "utf-8"
pub fn resolve_label(label: &str) -> Result<DetectedEncoding> {
    Encoding::for_label(label.trim().as_bytes())
        .map(DetectedEncoding::new)
        .ok_or_else(|| ConversionError::UnsupportedEncoding(label.to_string()))
}

/// GB2312 and GBK are both read as their GB18030 superset
fn upgrade_legacy_chinese(encoding: &'static Encoding) -> &'static Encoding {
    if encoding == GBK {
        GB18030
    } else {
        encoding
    }
}

fn decodes_cleanly(encoding: &'static Encoding, sample: &[u8]) -> bool {
    let mut decoder = encoding.new_decoder_without_bom_handling();
    let capacity = decoder
        .max_utf8_buffer_length_without_replacement(sample.len())
        .unwrap_or(sample.len() * 4);
    let mut decoded = String::with_capacity(capacity);
    // `last = false` so a trailing partial character is not an error
    let (result, _read) = decoder.decode_to_string_without_replacement(sample, &mut decoded, false);
    !matches!(result, DecoderResult::Malformed(_, _))
}
