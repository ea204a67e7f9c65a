use crate::cli::args::{Cli, Commands, ConvertArgs};
use crate::config::Settings;
use crate::error::{ConversionError, Result};
use crate::models::{ConversionRequest, JobReport, OutputSystems, ProgressEvent};
use crate::processors::{convert_lonlat, prepare_outputs, JobRunner};
use crate::readers::preview_csv;
use crate::utils::progress::ProgressReporter;
use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub async fn run(cli: Cli) -> Result<ExitCode> {
    let Cli {
        command,
        verbose,
        log_file,
        config,
    } = cli;

    init_logging(verbose, log_file.as_deref())?;

    match command {
        Commands::Convert(args) => {
            let settings = Settings::load(config.as_deref())?;
            debug!("Loaded settings: {:?}", settings);
            convert(settings, args).await
        }

        Commands::Preview {
            file,
            rows,
            header,
            json,
        } => {
            let preview = preview_csv(&file, rows)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&preview)?);
            } else {
                println!("File: {} ({})", file.display(), preview.encoding);
                println!("Columns: {}\n", preview.column_count);
                print!("{}", preview.render_table(header));
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::Transform { lon, lat, from, to } => {
            let outputs: OutputSystems = if to.is_empty() {
                OutputSystems::all()
            } else {
                to.into_iter().collect()
            };
            let values = convert_lonlat(lon, lat, from, outputs);
            for (system, pair) in outputs.iter().zip(values.chunks(2)) {
                println!("{:<6} {:?} {:?}", system.name(), pair[0], pair[1]);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Command-line flags take precedence over the loaded settings
pub fn build_request(settings: &Settings, args: &ConvertArgs) -> ConversionRequest {
    let mut request = settings.to_request(args.files.clone());

    if args.header {
        request.include_header = true;
    }
    if let Some(lon) = args.lon {
        request.lon_index = lon;
    }
    if let Some(lat) = args.lat {
        request.lat_index = lat;
    }
    if args.same_column {
        request.same_column = true;
    }
    if request.same_column {
        request.lat_index = request.lon_index;
    }
    if let Some(separator) = args.separator {
        request.separator = separator;
    }
    if let Some(source) = args.from {
        request.source = source;
    }
    if !args.to.is_empty() {
        request.outputs = args.to.iter().copied().collect();
    }
    if args.encoding.is_some() {
        request.encoding = args.encoding.clone();
    }
    request
}

async fn convert(settings: Settings, args: ConvertArgs) -> Result<ExitCode> {
    let request = build_request(&settings, &args);
    let runner = JobRunner::new(request)?;

    let overwrite = args.overwrite || settings.overwrite;
    let removed = prepare_outputs(&runner.request().input_paths, overwrite)?;
    for path in &removed {
        debug!("Overwriting {}", path.display());
    }

    print_job_header(&runner, args.json);

    let reporter = if args.json {
        ProgressReporter::new_spinner("", true)
    } else if std::io::stdout().is_terminal() {
        ProgressReporter::new_spinner("Converting...", false)
    } else {
        ProgressReporter::plain()
    };

    let (handle, mut events) = runner.spawn();
    while let Some(event) = events.recv().await {
        if args.json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            reporter.report(&event);
        }
        if let ProgressEvent::JobFinished { files, failed } = event {
            reporter.finish_with_message(&format!(
                "Converted {} of {} file(s)",
                files - failed,
                files
            ));
        }
    }
    let report = handle.await?;

    if !args.json {
        println!("\n{}", report.summary());
    }

    if let Some(path) = &args.report {
        write_report(path, &report)?;
    }

    if report.failed_count() > 0 {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_job_header(runner: &JobRunner, json: bool) {
    if json {
        return;
    }
    let request = runner.request();
    println!("Converting {} file(s)", request.input_paths.len());
    println!("Source: {}, outputs: {}", request.source, request.outputs);
    if request.same_column {
        println!(
            "Coordinates: column {} split on '{}'",
            request.lon_index, request.separator
        );
    } else {
        println!(
            "Longitude column: {}, latitude column: {}",
            request.lon_index, request.lat_index
        );
    }
}

fn write_report(path: &Path, report: &JobReport) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(report)?)?;
    Ok(())
}

/// Level used when `RUST_LOG` is not set
fn default_log_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(verbose)));

    let result = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    result.map_err(|e| ConversionError::Config(format!("Failed to initialise logging: {}", e)))
}
