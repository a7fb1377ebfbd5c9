use anyhow::Context;
use clap::{Parser, Subcommand};
use scanmap_relay::config::Config;
use scanmap_relay::constants::DEFAULT_CONFIG_PATH;
use scanmap_relay::{logging, metrics, runner};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "scanmap_relay")]
#[command(about = "Forward new scanmap log entries to a Telegram chat")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the watermark file location
    #[arg(long)]
    state_file: Option<PathBuf>,

    /// Mode to run in; defaults to the `daemon` setting of the config file
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send new entries once and exit
    Once,
    /// Send new entries on a fixed cadence until interrupted
    Daemon {
        /// Seconds between batches (overrides update_interval_secs)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Print the messages the next batch would send, without sending them
    Preview,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let start = tokio::time::Instant::now();
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;
    if let Some(state_file) = cli.state_file {
        config.state_file = state_file;
    }

    let _guard = logging::init_logging(&config.log_dir).context("initializing logging")?;
    if let Some(addr) = config.metrics_addr {
        metrics::init_metrics(addr);
    }

    let mut relay = runner::build_relay(&config).context("building relay")?;

    let command = cli.command.unwrap_or(if config.daemon {
        Commands::Daemon { interval: None }
    } else {
        Commands::Once
    });

    let code = match command {
        Commands::Once => runner::run_oneshot(&mut relay).await,
        Commands::Daemon { interval } => {
            let interval = match interval {
                Some(0) => anyhow::bail!("--interval must be at least 1 second"),
                Some(secs) => Duration::from_secs(secs),
                None => config.update_interval(),
            };
            runner::run_daemon(&mut relay, interval, start)
                .await
                .context("installing the interrupt handler")?
        }
        Commands::Preview => {
            let messages = relay.preview().await.context("fetching the log feed")?;
            info!("{} entries would be sent", messages.len());
            for message in &messages {
                println!("{}\n----", message);
            }
            ExitCode::SUCCESS
        }
    };
    Ok(code)
}
