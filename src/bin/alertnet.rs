//! AlertNet command-line front end
//!
//! Loads a data document, executes one JSON request (from `--request` or
//! stdin) and prints the JSON response on stdout.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use alertnet::ir::from_json_lenient;
use alertnet::medical::parse_birthdate;
use alertnet::{
    AlertEngine, AlertError, Clock, FixedClock, ServiceConfig, SystemClock, ValidationError,
};

/// Command-line options
#[derive(Debug, Default)]
struct Options {
    /// Data document to load
    data: Option<PathBuf>,
    /// Service configuration file
    config: Option<PathBuf>,
    /// Reference date for ages, MM/dd/yyyy
    today: Option<String>,
    /// Write the data document back after a mutation
    save: bool,
    /// Request JSON; read from stdin when absent
    request: Option<String>,
}

fn usage() {
    println!("alertnet - emergency dispatch queries over resident records");
    println!();
    println!("USAGE:");
    println!("    alertnet --data <FILE> [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -d, --data <FILE>         Data document (persons, fireStations, medicalRecords)");
    println!("    -c, --config <FILE>       Service configuration (JSON)");
    println!("    -t, --today <DATE>        Reference date for ages, MM/dd/yyyy [default: today]");
    println!("    -s, --save                Save the data document after a mutation");
    println!("    -r, --request <JSON>      Request to execute [default: read stdin]");
    println!("    -h, --help                Print help information");
}

fn value_of(args: &[String], i: usize, flag: &str) -> Result<String, String> {
    args.get(i + 1)
        .cloned()
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--data" | "-d" => {
                options.data = Some(PathBuf::from(value_of(&args, i, "--data")?));
                i += 2;
            }
            "--config" | "-c" => {
                options.config = Some(PathBuf::from(value_of(&args, i, "--config")?));
                i += 2;
            }
            "--today" | "-t" => {
                options.today = Some(value_of(&args, i, "--today")?);
                i += 2;
            }
            "--request" | "-r" => {
                options.request = Some(value_of(&args, i, "--request")?);
                i += 2;
            }
            "--save" | "-s" => {
                options.save = true;
                i += 1;
            }
            "--help" | "-h" => {
                usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(options)
}

fn build_engine(options: &Options) -> Result<AlertEngine, AlertError> {
    let mut config = match &options.config {
        Some(path) => ServiceConfig::from_json_file(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(data) = &options.data {
        config.data_file = Some(data.clone());
    }
    if options.save {
        config.save_on_mutation = true;
    }

    let clock: Arc<dyn Clock> = match &options.today {
        Some(raw) => {
            let date = parse_birthdate(raw).ok_or_else(|| {
                AlertError::Validation(ValidationError::InvalidFormat {
                    field: "today".to_string(),
                    value: raw.clone(),
                    expected: "MM/dd/yyyy",
                })
            })?;
            Arc::new(FixedClock(date))
        }
        None => Arc::new(SystemClock),
    };
    AlertEngine::from_config(config, clock)
}

fn read_request(options: &Options) -> Result<String, AlertError> {
    if let Some(request) = &options.request {
        return Ok(request.clone());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| AlertError::internal(format!("read stdin: {e}")))?;
    Ok(buf)
}

fn run(options: &Options) -> Result<String, AlertError> {
    let engine = build_engine(options)?;
    let request = from_json_lenient(&read_request(options)?)?;
    tracing::debug!(request_id = %request.request_id, op = request.operation.name(), "parsed request");
    let response = engine.execute(request)?;
    serde_json::to_string_pretty(&response).map_err(|e| AlertError::internal(format!("encode response: {e}")))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {message}");
            usage();
            return ExitCode::from(2);
        }
    };

    match run(&options) {
        Ok(body) => {
            println!("{body}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let body = serde_json::json!({
                "status": err.status().code(),
                "error": err.to_string(),
            });
            println!("{body:#}");
            ExitCode::FAILURE
        }
    }
}
