//! index-publisher CLI
//!
//! Notifies the Google Indexing API and IndexNow engines about changed URLs.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use index_publisher::{
    error::Result,
    models::{Config, NotificationKind, PrecheckMode},
    pipeline::{self, OutputFormat, PublishArgs, SubmitArgs},
    utils::log::LogLevel,
};

/// Search-engine index publisher
#[derive(Parser, Debug)]
#[command(
    name = "index-publisher",
    version,
    about = "Notify search engines about updated and deleted URLs"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Log level: debug, info, warn, error, fatal
    #[arg(long, global = true, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// How unreachable URLs are handled: strict, skip, ignore
    #[arg(long, global = true)]
    precheck: Option<PrecheckMode>,

    /// Print the run summary as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Notify the Google Indexing API, one request per URL
    Publish {
        #[command(subcommand)]
        action: PublishAction,
    },

    /// Submit URLs to an IndexNow engine in batches
    Submit(SubmitOpts),

    /// Validate the configuration file
    Validate,
}

#[derive(Subcommand, Debug)]
enum PublishAction {
    /// Report URLs as updated
    Update(PublishOpts),
    /// Report URLs as deleted
    Delete(PublishOpts),
}

#[derive(Args, Debug)]
struct PublishOpts {
    /// URLs to notify
    #[arg(required = true)]
    urls: Vec<String>,

    /// Service-account key file [default: google.credentials_file from config]
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Pre-issued OAuth access token; takes precedence over --credentials
    #[arg(long, env = "GOOGLE_INDEXING_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Maximum number of requests to send in this run
    #[arg(long)]
    quota: Option<usize>,
}

#[derive(Args, Debug)]
struct SubmitOpts {
    /// URLs to submit
    #[arg(required = true)]
    urls: Vec<String>,

    /// Engine name (indexnow, bing, seznam, yandex) or endpoint URL
    #[arg(long)]
    engine: Option<String>,

    /// Host the URLs belong to (defaults to the first URL's host)
    #[arg(long)]
    host: Option<String>,

    /// IndexNow key
    #[arg(long, env = "INDEXNOW_KEY", hide_env_values = true)]
    key: Option<String>,

    /// URL of the key file, when not served at the host root
    #[arg(long)]
    key_location: Option<String>,

    /// Mark the URLs as deleted
    #[arg(long)]
    deleted: bool,

    /// Maximum number of batch posts to send in this run
    #[arg(long)]
    quota: Option<usize>,
}

/// Initialize logging to stdout at the given level.
fn init_logging(level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(level.to_filter())
        .target(env_logger::Target::Stdout)
        .format_timestamp_secs()
        .init();
}

async fn run(cli: Cli, mut config: Config) -> Result<()> {
    if let Some(mode) = cli.precheck {
        config.precheck.mode = mode;
    }
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    match cli.command {
        Command::Publish { action } => {
            let (kind, opts) = match action {
                PublishAction::Update(opts) => (NotificationKind::Updated, opts),
                PublishAction::Delete(opts) => (NotificationKind::Deleted, opts),
            };
            let args = PublishArgs {
                kind,
                urls: opts.urls,
                credentials: opts.credentials,
                token: opts.token,
                quota: opts.quota,
                format,
            };
            pipeline::run_publish(&config, &args).await
        }

        Command::Submit(opts) => {
            let args = SubmitArgs {
                engine: opts.engine,
                host: opts.host,
                key: opts.key,
                key_location: opts.key_location,
                urls: opts.urls,
                deleted: opts.deleted,
                quota: opts.quota,
                format,
            };
            pipeline::run_submit(&config, &args).await
        }

        Command::Validate => {
            // A broken file must fail here rather than fall back to defaults.
            let config = Config::load(&cli.config)?;
            pipeline::run_validate(&config, &cli.config)
        }
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = Config::load(&cli.config);
    let level = cli
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|c| c.logging.level.clone()))
        .unwrap_or_default();
    init_logging(LogLevel::parse(&level));

    let config = match loaded {
        Ok(config) => {
            log::debug!("Loaded configuration from {}", cli.config.display());
            config
        }
        Err(e) if cli.config.exists() => {
            log::warn!(
                "Config load failed from {}: {}. Using defaults.",
                cli.config.display(),
                e
            );
            Config::default()
        }
        Err(_) => {
            log::debug!("No config at {}, using defaults", cli.config.display());
            Config::default()
        }
    };

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
