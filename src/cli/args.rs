use crate::models::{CoordinateSystem, Separator};
use crate::utils::constants::DEFAULT_PREVIEW_ROWS;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "coord-converter")]
#[command(about = "Convert BD09, GCJ02 and WGS84 coordinates stored in CSV files")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Settings file [default: ./coord-converter.toml when present]"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Append converted coordinates to every row of one or more CSV files
    Convert(ConvertArgs),

    /// Show the first rows of a CSV file with their column indices
    Preview {
        #[arg(help = "CSV file to inspect")]
        file: PathBuf,

        #[arg(short, long, default_value_t = DEFAULT_PREVIEW_ROWS)]
        rows: usize,

        #[arg(long, help = "Treat the first row as column names")]
        header: bool,

        #[arg(long, help = "Print the preview as JSON")]
        json: bool,
    },

    /// Convert a single coordinate pair
    Transform {
        #[arg(allow_negative_numbers = true)]
        lon: f64,

        #[arg(allow_negative_numbers = true)]
        lat: f64,

        #[arg(long, value_parser = parse_system)]
        from: CoordinateSystem,

        #[arg(
            long,
            value_delimiter = ',',
            value_parser = parse_system,
            help = "Target systems [default: all]"
        )]
        to: Vec<CoordinateSystem>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    #[arg(required = true, help = "Input CSV files")]
    pub files: Vec<PathBuf>,

    #[arg(long, help = "First row holds column names")]
    pub header: bool,

    #[arg(long, help = "Longitude column index, starting at 0")]
    pub lon: Option<usize>,

    #[arg(long, help = "Latitude column index, starting at 0")]
    pub lat: Option<usize>,

    #[arg(long, help = "Longitude and latitude share the --lon column")]
    pub same_column: bool,

    #[arg(
        long,
        value_parser = parse_separator,
        help = "Separator inside a shared column: , ; | # - or space"
    )]
    pub separator: Option<Separator>,

    #[arg(long, value_parser = parse_system, help = "Source coordinate system")]
    pub from: Option<CoordinateSystem>,

    #[arg(
        long,
        value_delimiter = ',',
        value_parser = parse_system,
        help = "Output coordinate systems, e.g. gcj02,wgs84"
    )]
    pub to: Vec<CoordinateSystem>,

    #[arg(long, help = "Force the input encoding instead of detecting it")]
    pub encoding: Option<String>,

    #[arg(long, help = "Delete existing _result files before converting")]
    pub overwrite: bool,

    #[arg(long, help = "Print progress events as JSON lines")]
    pub json: bool,

    #[arg(long, help = "Write a JSON job report to this path")]
    pub report: Option<PathBuf>,
}

fn parse_system(value: &str) -> Result<CoordinateSystem, String> {
    value.parse().map_err(|e: crate::error::ConversionError| e.to_string())
}

fn parse_separator(value: &str) -> Result<Separator, String> {
    value.parse().map_err(|e: crate::error::ConversionError| e.to_string())
}
