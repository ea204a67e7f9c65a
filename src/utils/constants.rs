/// Number of leading bytes inspected to guess a file's encoding
pub const ENCODING_SAMPLE_SIZE: usize = 512;

/// Suffix inserted before the extension of every output file
pub const RESULT_FILE_SUFFIX: &str = "_result";

/// A row-count progress message is emitted every this many rows
pub const PROGRESS_INTERVAL: usize = 100;

/// Rows shown by the preview command after the first one
pub const DEFAULT_PREVIEW_ROWS: usize = 100;

/// Read buffer for the streaming decoder
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Config file picked up from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "coord-converter.toml";

/// Prefix of environment variables overriding config values
pub const ENV_PREFIX: &str = "COORD_CONVERTER";
