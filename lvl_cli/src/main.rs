use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lexlevel_engine::{
    AnalyzerConfig, AnalyzerRuntime, AnalyzerTelemetry, AnnotationFormat, LoopbackClassifier,
};

#[derive(Parser, Debug)]
#[command(name = "lvl", version, about = "CEFR word-level analyzer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyzes a text file (stdin when omitted) and prints the annotated
    /// rendering plus statistics.
    Analyze {
        /// Input file; reads stdin when omitted.
        file: Option<PathBuf>,
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        #[arg(long, value_enum, default_value = "inline")]
        format: OutputFormat,
        /// Seconds granted to the remote classification work.
        #[arg(long)]
        deadline_secs: Option<u64>,
        /// JSON-lines log file.
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Classifies the given words and prints the results as JSON.
    Classify {
        words: Vec<String>,
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        /// JSON-lines log file.
        #[arg(long)]
        log: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Inline,
    Html,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            file,
            data_dir,
            format,
            deadline_secs,
            log,
        } => {
            let text = read_input(file.as_deref())?;
            let config = AnalyzerConfig {
                data_dir,
                remote_deadline: deadline_secs.map(Duration::from_secs),
                annotation: match format {
                    OutputFormat::Html => AnnotationFormat::Html,
                    OutputFormat::Inline | OutputFormat::Json => AnnotationFormat::Inline,
                },
                ..AnalyzerConfig::default()
            };
            let runtime = bootstrap(config, log)?;
            let analysis = runtime.analyze(&text).await;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&analysis)?);
                }
                OutputFormat::Inline | OutputFormat::Html => {
                    println!("{}", analysis.annotated);
                    println!();
                    println!("{}", serde_json::to_string_pretty(&analysis.statistics)?);
                }
            }
            Ok(())
        }
        Commands::Classify {
            words,
            data_dir,
            log,
        } => {
            anyhow::ensure!(!words.is_empty(), "no words given");
            let config = AnalyzerConfig {
                data_dir,
                ..AnalyzerConfig::default()
            };
            let runtime = bootstrap(config, log)?;
            let results = runtime.classify_words(&words).await;
            println!("{}", serde_json::to_string_pretty(&results)?);
            Ok(())
        }
    }
}

fn bootstrap(config: AnalyzerConfig, log: Option<PathBuf>) -> Result<AnalyzerRuntime> {
    let runtime = AnalyzerRuntime::bootstrap(config, Arc::new(LoopbackClassifier::default()));
    match log {
        Some(path) => {
            let telemetry = AnalyzerTelemetry::to_file("lvl", &path)
                .with_context(|| format!("opening log {path:?}"))?;
            Ok(runtime.with_telemetry(telemetry))
        }
        None => Ok(runtime),
    }
}

fn read_input(file: Option<&std::path::Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {path:?}")),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            Ok(text)
        }
    }
}
