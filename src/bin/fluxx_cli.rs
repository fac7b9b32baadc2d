//! Command-line interface to the Fluxx REST API.
//!
//! Reads and writes JSON. Batch commands take records on stdin and print one
//! outcome per record, in input order, on stdout. Logs go to stderr.
//!
//! ```sh
//! export ACME_INSTANCE=acme ACME_CLIENT=... ACME_SECRET=...
//! fluxx-cli --instance acme list user --cols id,email
//! cat records.json | fluxx-cli --instance acme upsert organization --threads 8
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fluxx_auth::FluxxCredentials;
use fluxx_batch::{
    parse_input, Batch, BatchConfig, FluxxConnector, KindSelection, OperationKind,
    RetryController, DEFAULT_MAX_RETRY_DELAY,
};
use fluxx_rest::{ClientConfig, FluxxRestClient, ListOptions, Style};

#[derive(Parser, Debug)]
#[command(name = "fluxx-cli", version, about = "Read and write Fluxx records as JSON")]
struct Cli {
    /// Credential prefix: reads <NAME>_INSTANCE, <NAME>_CLIENT and <NAME>_SECRET
    #[arg(long, env = "FLUXX_INSTANCE", global = true)]
    instance: Option<String>,

    /// REST API version
    #[arg(long, default_value = fluxx_client::DEFAULT_API_VERSION, global = true)]
    api_version: String,

    /// Response style (detail, compact, full)
    #[arg(long, default_value = "full", global = true)]
    style: String,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one page of records
    List {
        model: String,

        /// Comma-separated columns
        #[arg(long, value_delimiter = ',', default_value = "id")]
        cols: Vec<String>,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 100)]
        per_page: u32,

        /// Filter expression as JSON
        #[arg(long)]
        filter: Option<String>,
    },

    /// Print a single record
    Get {
        model: String,
        id: String,

        /// Comma-separated columns
        #[arg(long, value_delimiter = ',', default_value = "id")]
        cols: Vec<String>,
    },

    /// Create every record read from stdin
    Create(BatchArgs),

    /// Update every record read from stdin by its id
    Update(BatchArgs),

    /// Delete every record read from stdin by its id
    Delete(BatchArgs),

    /// Create records without an id, update the rest; honours per-record `method`
    Upsert(BatchArgs),
}

#[derive(Args, Debug)]
struct BatchArgs {
    model: String,

    /// Number of concurrent workers, each with its own session
    #[arg(long, default_value_t = fluxx_batch::DEFAULT_WORKERS)]
    threads: usize,

    /// Give up on a record after this many retries (default: retry forever)
    #[arg(long)]
    max_retries: Option<u32>,

    /// Seconds to wait before retrying a transient failure
    #[arg(long, default_value_t = 60)]
    backoff_secs: u64,
}

impl Command {
    /// Batch arguments and how each record's operation is chosen, or `None`
    /// for the read commands.
    fn into_batch(self) -> Option<(BatchArgs, KindSelection)> {
        match self {
            Command::Create(args) => Some((args, KindSelection::Force(OperationKind::Create))),
            Command::Update(args) => Some((args, KindSelection::Force(OperationKind::Update))),
            Command::Delete(args) => Some((args, KindSelection::Force(OperationKind::Delete))),
            Command::Upsert(args) => Some((args, KindSelection::Infer)),
            Command::List { .. } | Command::Get { .. } => None,
        }
    }
}

impl BatchArgs {
    fn retry(&self) -> RetryController {
        let backoff = Duration::from_secs(self.backoff_secs);
        // The ceiling never undercuts an explicitly requested backoff.
        let retry = RetryController::new()
            .with_initial_delay(backoff)
            .with_max_delay(backoff.max(DEFAULT_MAX_RETRY_DELAY));
        match self.max_retries {
            Some(max) => retry.with_max_retries(max),
            None => retry,
        }
    }

    fn batch_config(&self) -> BatchConfig {
        BatchConfig::new()
            .with_workers(self.threads)
            .with_retry(self.retry())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let instance = cli
        .instance
        .as_deref()
        .context("no instance given; pass --instance or set FLUXX_INSTANCE")?;
    let credentials = FluxxCredentials::from_env(instance)
        .with_context(|| format!("loading credentials for {instance}"))?;
    let style: Style = cli.style.parse()?;

    match cli.command {
        Command::List {
            model,
            cols,
            page,
            per_page,
            filter,
        } => {
            let mut options = ListOptions::new()
                .with_cols(cols)
                .with_page(page)
                .with_per_page(per_page);
            if let Some(filter) = filter {
                let filter = serde_json::from_str(&filter).context("parsing --filter")?;
                options = options.with_filter(filter);
            }
            let client = connect(&credentials, &cli.api_version, style).await?;
            let records = client.list(&model, &options).await?;
            println!("{}", serde_json::to_string(&records)?);
        }
        Command::Get { model, id, cols } => {
            let client = connect(&credentials, &cli.api_version, style).await?;
            let record = client.get(&model, &id, &cols).await?;
            println!("{}", serde_json::to_string(&record)?);
        }
        command => {
            if let Some((args, selection)) = command.into_batch() {
                run_batch(credentials, &cli.api_version, style, args, selection).await?;
            }
        }
    }

    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn connect(
    credentials: &FluxxCredentials,
    api_version: &str,
    style: Style,
) -> Result<FluxxRestClient> {
    let client = FluxxRestClient::connect(credentials, api_version, ClientConfig::default())
        .await
        .context("connecting to Fluxx")?;
    Ok(client.with_style(style))
}

async fn run_batch(
    credentials: FluxxCredentials,
    api_version: &str,
    style: Style,
    args: BatchArgs,
    selection: KindSelection,
) -> Result<()> {
    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("reading records from stdin")?;
    let operations = parse_input(&input, &args.model, &selection)?;

    let config = args.batch_config();

    let connector = FluxxConnector::new(credentials)
        .with_api_version(api_version)
        .with_style(style);

    info!(
        model = %args.model,
        records = operations.len(),
        workers = args.threads,
        "Starting batch"
    );
    let outcomes = Batch::new(connector, config).run(operations).await?;

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    info!(total = outcomes.len(), failed, "Batch finished");

    println!("{}", serde_json::to_string(&outcomes)?);
    Ok(())
}
