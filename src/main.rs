//! mustache-layouts CLI
//!
//! Usage:
//!   mustache-layouts --config <FILE> [OPTIONS] [NAME]
//!
//! Options:
//!   -c, --config <FILE>  Renderer declarations (TOML format)
//!   -d, --data <FILE>    JSON context (reads from stdin if not provided)
//!   -l, --list           List registered renderers
//!   --debug-context      Wrap the data in the debug partial's context
//!   -h, --help           Print help

use std::fs;
use std::io::{self, BufWriter, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use mustache_layouts::{
    build_from_config, Config, DebugContext, EngineError, PartialBuild, RegistryError,
};

#[derive(Parser)]
#[command(name = "mustache-layouts")]
#[command(about = "Render named mustache templates, partials and layouts")]
struct Cli {
    /// Renderer to run
    name: Option<String>,

    /// Renderer declarations (TOML format)
    #[arg(short, long)]
    config: PathBuf,

    /// JSON context (reads from stdin if not provided)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// List registered renderers and exit
    #[arg(short, long)]
    list: bool,

    /// Wrap the data in the debug partial's context
    #[arg(long)]
    debug_context: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mustache_layouts=warn")),
        )
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("Error: {}", message);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = Config::from_file(&cli.config)
        .map_err(|e| format!("loading config '{}': {}", cli.config.display(), e))?;

    let registry = match build_from_config(&config) {
        Ok(registry) => registry,
        Err(failure) => return Err(report_build_failure(&failure)),
    };

    if cli.list {
        for name in registry.names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let name = cli
        .name
        .as_deref()
        .ok_or_else(|| "no renderer name given (use --list to see them)".to_string())?;

    let mut context = read_context(cli.data.as_deref())?;
    if cli.debug_context {
        context = DebugContext::new()
            .with_response(&context)
            .to_value()
            .map_err(|e| format!("building debug context: {}", e))?;
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    registry
        .render(name, &context, &mut out)
        .map_err(|e| error_chain(&e))?;
    out.flush().map_err(|e| format!("writing output: {}", e))
}

/// Read the JSON context from a file, or stdin when it is piped
fn read_context(path: Option<&Path>) -> Result<Value, String> {
    let text = match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| format!("reading data file '{}': {}", path.display(), e))?,
        None if io::stdin().is_terminal() => return Ok(Value::Object(Default::default())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("reading from stdin: {}", e))?;
            buffer
        }
    };

    if text.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(&text).map_err(|e| format!("parsing data as JSON: {}", e))
}

/// Describe a failed build, with source context for parse errors
fn report_build_failure(failure: &PartialBuild) -> String {
    if let RegistryError::Parse {
        path,
        source: EngineError::Parse(errors),
    } = &failure.error
    {
        if let Ok(source) = fs::read_to_string(path) {
            let filename = path.display().to_string();
            for error in errors {
                eprint!("{}", error.format(&source, &filename));
            }
        }
    }
    error_chain(&failure.error)
}

/// Format an error and its sources on one line
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
