use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cv_parser::extraction::{PdfTextExtractor, PlainTextExtractor, TextExtractor};
use cv_parser::parser::CvParser;

#[derive(Parser)]
#[command(name = "cv-parse")]
#[command(version, about = "Extract structured CV data from a PDF or text résumé")]
struct Cli {
    /// Path to the CV (PDF unless --text is given)
    input: PathBuf,

    /// Write the JSON record here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Debug-level logging on stderr
    #[arg(short, long)]
    verbose: bool,

    /// Treat the input as plain text and skip PDF extraction
    #[arg(long)]
    text: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("cv_parser={level},cv_parse={level}"))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if !cli.input.exists() {
        error!("Input file not found: {}", cli.input.display());
        return Ok(ExitCode::FAILURE);
    }

    let parser = CvParser::new().context("Failed to build CV parser")?;
    let extractor: Box<dyn TextExtractor> = if cli.text {
        Box::new(PlainTextExtractor)
    } else {
        Box::new(PdfTextExtractor)
    };

    info!("Parsing {}", cli.input.display());
    let record = parser.parse_file(&cli.input, extractor.as_ref());
    let json = serde_json::to_string_pretty(&record).context("Failed to serialize CV")?;

    match &cli.output {
        Some(path) => {
            fs::write(path, format!("{json}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }

    Ok(ExitCode::SUCCESS)
}
