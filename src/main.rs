use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use codenotes::annotator::{self, Verbosity};
use codenotes::config::Config;
use codenotes::languages::{Language, LanguageConfig};
use codenotes::mcp::server::{McpContext, McpServer};
use codenotes::{http, repair};

#[derive(Parser)]
#[command(name = "codenotes")]
#[command(about = "Annotate code with explanatory comments and repair broken Python snippets")]
#[command(version)]
struct Cli {
    /// Path to the JSON config file (default: codenotes.json)
    #[arg(long, global = true, default_value = "")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the JSON API over HTTP
    Serve {
        /// Override listen_addr from the config
        #[arg(long)]
        listen: Option<String>,
    },
    /// Serve the MCP tools over stdio
    Mcp,
    /// Print an annotated copy of a source file
    Annotate {
        file: PathBuf,
        /// Language name; guessed from the file extension when omitted
        #[arg(long)]
        language: Option<String>,
        /// Also comment returns, raises, assignments and library calls
        #[arg(long)]
        detailed: bool,
    },
    /// Print a repaired copy of a Python file; the fixes go to stderr
    Repair { file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout belongs to the MCP transport and to command output
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config).context("Failed to load config")?;
    config.validate().context("Invalid configuration")?;

    match cli.command {
        Commands::Serve { listen } => {
            let mut config = config;
            if let Some(addr) = listen {
                config.listen_addr = addr;
            }
            http::serve(config).await?;
        }
        Commands::Mcp => {
            info!("Starting codenotes MCP Server...");
            let server = McpServer::new(McpContext::new(config));
            server.start().await?;
        }
        Commands::Annotate {
            file,
            language,
            detailed,
        } => {
            let source = read_source(&file)?;
            let language = match language {
                Some(name) => config.resolve_language(&name)?,
                None => detect_language(&file)?,
            };
            let verbosity = if detailed {
                Verbosity::Detailed
            } else {
                config.annotation.verbosity
            };
            let annotated = annotator::annotate_with(&source, language, verbosity)
                .with_context(|| format!("Failed to annotate {}", file.display()))?;
            print!("{}", annotated.annotated_text);
        }
        Commands::Repair { file } => {
            let source = read_source(&file)?;
            let result = repair::repair(&source);
            for change in &result.changes {
                eprintln!("{change}");
            }
            print!("{}", result.fixed_text);
        }
    }

    Ok(())
}

fn read_source(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}

fn detect_language(file: &Path) -> Result<Language> {
    let Some(ext) = file.extension().and_then(|e| e.to_str()) else {
        bail!("Cannot guess the language of {}; pass --language", file.display());
    };
    match LanguageConfig::get_by_extension(ext) {
        Some(config) => Ok(config.language),
        None => bail!("Unsupported file extension: .{ext}"),
    }
}
