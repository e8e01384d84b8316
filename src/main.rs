use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use mockscope::export::ExportFormat;
use mockscope::parser::SourceLanguage;
use mockscope::{generate_with, MockOptions};

#[derive(Parser)]
#[command(name = "mockscope")]
#[command(version)]
#[command(about = "Generate jest.mock() registrations from how a file uses its imports", long_about = None)]
struct Cli {
    /// Source file to analyze ("-" or omitted reads stdin)
    file: Option<PathBuf>,

    /// Module path to skip (repeatable)
    #[arg(short, long = "exclude", value_name = "MODULE")]
    exclude: Vec<String>,

    /// Only mock these module paths (repeatable)
    #[arg(short, long = "include", value_name = "MODULE")]
    include: Vec<String>,

    /// Register every module without a factory
    #[arg(short, long)]
    automock: bool,

    /// TOML file with exclude/include/automock defaults
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format: jest or json
    #[arg(short, long, default_value = "jest")]
    format: ExportFormat,

    /// Log analysis details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    info!("Starting mockscope v{}", env!("CARGO_PKG_VERSION"));

    let mut options = match &cli.config {
        Some(path) => MockOptions::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => MockOptions::default(),
    };
    options = options
        .with_exclude(cli.exclude)
        .with_include(cli.include);
    if cli.automock {
        options = options.with_automock(true);
    }
    debug!("Options: {:?}", options);

    let (source, language) = match cli.file.as_deref() {
        Some(path) if path.as_os_str() != "-" => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            (source, SourceLanguage::from_path(path))
        }
        _ => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read stdin")?;
            (source, SourceLanguage::default())
        }
    };

    let output = generate_with(&source, language, &options, cli.format)?;
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}
