pub mod file_converter;
pub mod job_runner;
pub mod row_converter;

pub use file_converter::{convert_file, FileConverter};
pub use job_runner::{prepare_outputs, JobRunner};
pub use row_converter::{convert_lonlat, extract_lonlat, header_columns, RowConverter};
