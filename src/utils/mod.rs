pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{existing_results, result_file_path};
pub use progress::ProgressReporter;
