//! Argument parsing, logging setup, and command dispatch.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::anyhow;
use clap::{Args, Parser, Subcommand, ValueEnum};
use docdeck_api_models::GenerationConfig;
use docdeck_telemetry::{LogFormat, LoggingConfig, build_sha, init_logging};
use docdeck_ui::core::config::{ViewConfig, ViewConfigDocument, ViewConfigError};
use tokio::task::LocalSet;
use url::Url;

use crate::client::{AppContext, CliError, CliResult, parse_url};
use crate::commands::documents::{handle_chunks, handle_ls, handle_rm, handle_upload};
use crate::commands::query::handle_query;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_API_URL: &str = "http://127.0.0.1:7272";

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    if let Err(err) = install_logging(&cli) {
        eprintln!("error: {}", err.display_message());
        return err.exit_code();
    }
    tracing::debug!(build = build_sha(), command = command_label(&cli.command), "starting");

    let local = LocalSet::new();
    match local.run_until(dispatch(cli)).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

fn install_logging(cli: &Cli) -> CliResult<()> {
    let format = match cli.log_format.as_deref() {
        Some(raw) => raw
            .parse::<LogFormat>()
            .map_err(|err| CliError::validation(err.to_string()))?,
        None => LogFormat::infer(),
    };
    let config = LoggingConfig {
        level: &cli.log_level,
        format,
        build_sha: option_env!("DOCDECK_BUILD_SHA").unwrap_or("dev"),
    };
    init_logging(&config).map_err(CliError::failure)
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let view_config = cli.view_config()?;
    let ctx = AppContext::new(cli.api_url, Duration::from_secs(cli.timeout))?;

    match cli.command {
        Command::Ls(args) => handle_ls(&ctx, view_config, &args, cli.output).await,
        Command::Rm(args) => handle_rm(&ctx, view_config, &args).await,
        Command::Upload(args) => handle_upload(&ctx, view_config, args).await,
        Command::Query(args) => handle_query(view_config, &args),
        Command::Chunks(args) => handle_chunks(&ctx, view_config, &args, cli.output).await,
    }
}

#[derive(Parser)]
#[command(name = "docdeck", about = "Inspect and curate a Docdeck document collection")]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "DOCDECK_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(
        long,
        global = true,
        env = "DOCDECK_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    pub(crate) timeout: u64,
    #[arg(
        long,
        global = true,
        env = "DOCDECK_CONFIG",
        help = "JSON file with view settings; flags take precedence"
    )]
    pub(crate) config: Option<PathBuf>,
    #[arg(long, global = true, env = "DOCDECK_PAGE_SIZE")]
    pub(crate) page_size: Option<usize>,
    #[arg(long, global = true, env = "DOCDECK_MAX_RETRIES")]
    pub(crate) max_retries: Option<u32>,
    #[arg(long, global = true, env = "DOCDECK_RETRY_DELAY_MS")]
    pub(crate) retry_delay_ms: Option<u64>,
    #[arg(long, global = true, env = "DOCDECK_LOG_LEVEL", default_value = "warn")]
    pub(crate) log_level: String,
    #[arg(
        long,
        global = true,
        env = "DOCDECK_LOG_FORMAT",
        help = "json or pretty (defaults by build profile)"
    )]
    pub(crate) log_format: Option<String>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

impl Cli {
    pub(crate) fn view_config(&self) -> CliResult<ViewConfig> {
        let file = match &self.config {
            Some(path) => read_config_file(path)?,
            None => ViewConfigDocument::default(),
        };
        let flags = ViewConfigDocument {
            page_size: self.page_size,
            max_retries: self.max_retries,
            retry_delay_ms: self.retry_delay_ms,
            // No fade-in on a terminal.
            transition_delay_ms: Some(0),
            failure_message: None,
        };
        ViewConfig::from_document(file.overlay(flags))
            .map_err(|err| CliError::validation(err.to_string()))
    }
}

fn read_config_file(path: &Path) -> CliResult<ViewConfigDocument> {
    let raw = std::fs::read_to_string(path).map_err(|err| {
        CliError::failure(anyhow!("failed to read config '{}': {err}", path.display()))
    })?;
    ViewConfigDocument::from_json_str(&raw).map_err(|err| match err {
        ViewConfigError::Parse { source } => {
            CliError::validation(format!("invalid config '{}': {source}", path.display()))
        }
        other => CliError::validation(other.to_string()),
    })
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// List one page of documents.
    Ls(ListArgs),
    /// Delete documents by id.
    Rm(RemoveArgs),
    /// Upload a new document or replace an existing one.
    Upload(UploadArgs),
    /// Print the query payload built from the search toggles.
    Query(QueryArgs),
    /// Show the stored chunks of one document.
    Chunks(ChunksArgs),
}

#[derive(Args)]
pub(crate) struct ListArgs {
    #[arg(long, default_value_t = 1, help = "1-based page to show")]
    pub(crate) page: usize,
}

#[derive(Args)]
pub(crate) struct RemoveArgs {
    #[arg(required = true, num_args = 1.., help = "Document identifiers")]
    pub(crate) ids: Vec<String>,
}

#[derive(Args)]
pub(crate) struct UploadArgs {
    #[arg(help = "File to upload")]
    pub(crate) path: PathBuf,
    #[arg(long, help = "Replace the contents of this document instead of ingesting")]
    pub(crate) replace: Option<String>,
}

#[derive(Args)]
pub(crate) struct ChunksArgs {
    #[arg(help = "Document identifier")]
    pub(crate) id: String,
}

#[derive(Args)]
pub(crate) struct QueryArgs {
    #[arg(help = "Query text")]
    pub(crate) query: String,
    #[arg(long, help = "Enable hybrid search")]
    pub(crate) hybrid: bool,
    #[arg(long, help = "Disable vector search")]
    pub(crate) no_vector: bool,
    #[arg(long)]
    pub(crate) model: Option<String>,
    #[arg(long, default_value_t = GenerationConfig::default().temperature)]
    pub(crate) temperature: f32,
    #[arg(long, default_value_t = GenerationConfig::default().top_p)]
    pub(crate) top_p: f32,
    #[arg(long, default_value_t = GenerationConfig::default().top_k)]
    pub(crate) top_k: u32,
    #[arg(long, default_value_t = GenerationConfig::default().max_tokens_to_sample)]
    pub(crate) max_tokens: u32,
}

impl QueryArgs {
    pub(crate) fn generation(&self) -> GenerationConfig {
        GenerationConfig {
            model: self.model.clone(),
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
            max_tokens_to_sample: self.max_tokens,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Ls(_) => "ls",
        Command::Rm(_) => "rm",
        Command::Upload(_) => "upload",
        Command::Query(_) => "query",
        Command::Chunks(_) => "chunks",
    }
}
