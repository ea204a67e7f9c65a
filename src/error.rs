use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConversionError>;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column {index} does not exist (row has {len} columns)")]
    MissingColumn { index: usize, len: usize },

    #[error("Invalid coordinate value: '{value}'")]
    InvalidNumber { value: String },

    #[error("Cannot split '{value}' into longitude and latitude with separator '{separator}'")]
    InvalidLonLatPair { value: String, separator: char },

    #[error("Row contains characters that cannot be encoded as {encoding}")]
    Unencodable { encoding: &'static str },

    #[error("Unsupported text encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ConversionError {
    /// Errors that only affect a single row and never abort a file
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            ConversionError::MissingColumn { .. }
                | ConversionError::InvalidNumber { .. }
                | ConversionError::InvalidLonLatPair { .. }
                | ConversionError::Csv(_)
                | ConversionError::Unencodable { .. }
        )
    }
}
