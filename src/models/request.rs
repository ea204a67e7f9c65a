use crate::error::{ConversionError, Result};
use crate::models::{CoordinateSystem, OutputSystems};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use validator::{Validate, ValidationError};

/// Separator between longitude and latitude when both live in one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Separator {
    #[default]
    Comma,
    Semicolon,
    Pipe,
    Hash,
    Dash,
    Space,
}

impl Separator {
    pub const ALL: [Separator; 6] = [
        Separator::Comma,
        Separator::Semicolon,
        Separator::Pipe,
        Separator::Hash,
        Separator::Dash,
        Separator::Space,
    ];

    pub fn as_char(&self) -> char {
        match self {
            Separator::Comma => ',',
            Separator::Semicolon => ';',
            Separator::Pipe => '|',
            Separator::Hash => '#',
            Separator::Dash => '-',
            Separator::Space => ' ',
        }
    }
}

impl fmt::Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Separator::Space => write!(f, "space"),
            other => write!(f, "{}", other.as_char()),
        }
    }
}

impl FromStr for Separator {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("space") || s == " " {
            return Ok(Separator::Space);
        }
        Separator::ALL
            .into_iter()
            .find(|sep| s.len() == 1 && s.starts_with(sep.as_char()))
            .ok_or_else(|| {
                ConversionError::InvalidArgument(format!(
                    "Unsupported separator '{}'. Expected one of: , ; | # - space",
                    s
                ))
            })
    }
}

impl TryFrom<String> for Separator {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Separator> for String {
    fn from(value: Separator) -> Self {
        value.to_string()
    }
}

/// Everything needed to convert one batch of CSV files
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConversionRequest {
    #[validate(length(min = 1))]
    pub input_paths: Vec<PathBuf>,

    pub include_header: bool,

    pub lon_index: usize,

    pub lat_index: usize,

    pub same_column: bool,

    pub separator: Separator,

    pub source: CoordinateSystem,

    #[validate(custom(function = "validate_outputs"))]
    pub outputs: OutputSystems,

    /// Encoding label forced by the user instead of auto-detection
    pub encoding: Option<String>,
}

fn validate_outputs(outputs: &OutputSystems) -> std::result::Result<(), ValidationError> {
    if outputs.is_empty() {
        let mut error = ValidationError::new("empty_outputs");
        error.message = Some("at least one output coordinate system is required".into());
        return Err(error);
    }
    Ok(())
}

impl ConversionRequest {
    pub fn new(input_paths: Vec<PathBuf>, source: CoordinateSystem, outputs: OutputSystems) -> Self {
        Self {
            input_paths,
            include_header: false,
            lon_index: 0,
            lat_index: 1,
            same_column: false,
            separator: Separator::default(),
            source,
            outputs,
            encoding: None,
        }
    }

    pub fn with_header(mut self, include_header: bool) -> Self {
        self.include_header = include_header;
        self
    }

    pub fn with_columns(mut self, lon_index: usize, lat_index: usize) -> Self {
        self.lon_index = lon_index;
        self.lat_index = lat_index;
        self.same_column = false;
        self
    }

    pub fn with_same_column(mut self, index: usize, separator: Separator) -> Self {
        self.lon_index = index;
        self.lat_index = index;
        self.same_column = true;
        self.separator = separator;
        self
    }

    pub fn with_encoding(mut self, encoding: Option<String>) -> Self {
        self.encoding = encoding;
        self
    }

    /// Drop input paths naming a file that is already in the batch, keeping
    /// the first occurrence. Returns the dropped paths.
    pub fn dedup_inputs(&mut self) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        let mut dropped = Vec::new();
        self.input_paths.retain(|path| {
            let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.clone());
            if seen.insert(key) {
                true
            } else {
                dropped.push(path.clone());
                false
            }
        });
        dropped
    }
}
