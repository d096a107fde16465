use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codemap_core::Parser as _;
use codemap_core::{CodeElement, CodeExtractor, Config};
use futures::stream::{self, StreamExt};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "codemap")]
#[command(about = "List the functions, classes, methods and imports of source files", long_about = None)]
struct Cli {
    /// Path to a config file (defaults to ./codemap.toml, then the user config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract elements from source files
    Parse {
        /// Files to parse
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print elements as JSON
        #[arg(long)]
        json: bool,

        /// Number of files parsed concurrently
        #[arg(short, long, default_value_t = 8)]
        jobs: usize,
    },
    /// Extract fenced code blocks from a documentation file
    Markdown {
        path: PathBuf,

        /// Print blocks as JSON
        #[arg(long)]
        json: bool,
    },
    /// List registered languages and their extensions
    Languages,
    /// Print the default configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("codemap_core=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { paths, json, jobs } => {
            let extractor = Arc::new(load_extractor(cli.config)?);
            parse_files(extractor, paths, json, jobs).await
        }
        Commands::Markdown { path, json } => {
            let extractor = load_extractor(cli.config)?;
            if !CodeExtractor::is_markdown(&path.to_string_lossy()) {
                tracing::warn!("{} does not look like a markdown file", path.display());
            }
            let blocks = extractor.parse_markdown(&path)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&blocks)?);
            } else {
                for block in &blocks {
                    println!(
                        "{} [{}] lines {}-{}",
                        block.name, block.language, block.start_line, block.end_line
                    );
                }
            }
            Ok(())
        }
        Commands::Languages => {
            let extractor = load_extractor(cli.config)?;
            for registration in extractor.registrations() {
                println!(
                    "{:<12} {:<11} {}",
                    registration.language,
                    registration.parser.capability().to_string(),
                    registration.extensions.join(", ")
                );
            }
            Ok(())
        }
        Commands::Config => {
            print!("{}", Config::default_config_string());
            Ok(())
        }
    }
}

fn load_extractor(path: Option<PathBuf>) -> Result<CodeExtractor> {
    match path {
        Some(path) => CodeExtractor::from_config_file(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => CodeExtractor::load().context("Failed to load config"),
    }
}

/// Parse every file on a bounded stream, printing results in input order.
async fn parse_files(
    extractor: Arc<CodeExtractor>,
    paths: Vec<PathBuf>,
    json: bool,
    jobs: usize,
) -> Result<()> {
    let mut results = stream::iter(paths)
        .map(|path| {
            let extractor = Arc::clone(&extractor);
            async move {
                let result = extractor.parse_file_async(&path).await;
                (path, result)
            }
        })
        .buffered(jobs.max(1));

    let mut failures = 0usize;
    let mut all: Vec<CodeElement> = Vec::new();

    while let Some((path, result)) = results.next().await {
        match result {
            Ok(elements) if json => all.extend(elements),
            Ok(elements) => print_elements(&elements),
            Err(e) => {
                failures += 1;
                eprintln!("error: {}", e);
                tracing::debug!("Skipping {}", path.display());
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&all)?);
    }

    if failures > 0 {
        anyhow::bail!("{} file(s) could not be read", failures);
    }
    Ok(())
}

fn print_elements(elements: &[CodeElement]) {
    let Some((file, rest)) = elements.split_first() else {
        return;
    };
    println!("{} ({}, {} lines)", file.file_path, file.language, file.end_line);
    if !file.imports.is_empty() {
        println!("  imports: {}", file.imports.join(", "));
    }
    if !file.exports.is_empty() {
        println!("  exports: {}", file.exports.join(", "));
    }

    for element in rest {
        let mut line = format!(
            "  {:<9} {} [{}-{}]",
            element.kind.as_str(),
            element.name,
            element.start_line,
            element.end_line
        );
        if let Some(complexity) = element.complexity {
            line.push_str(&format!(" complexity={}", complexity));
        }
        if !element.modifiers.is_empty() {
            let modifiers: Vec<&str> = element.modifiers.iter().map(String::as_str).collect();
            line.push_str(&format!(" ({})", modifiers.join(" ")));
        }
        println!("{}", line);
    }
    println!();
}
