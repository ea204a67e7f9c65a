pub mod crs;
pub mod progress;
pub mod request;

pub use crs::{CoordinateSystem, OutputSystems};
pub use progress::{FileOutcome, FileSummary, JobReport, ProgressEvent, ProgressSink};
pub use request::{ConversionRequest, Separator};
