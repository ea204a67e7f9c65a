pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ConvertArgs};
pub use commands::{build_request, run};
