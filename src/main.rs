use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use upstream_check::config::{self, ScanConfig};
use upstream_check::pool::Logger;
use upstream_check::probe::DefaultProber;
use upstream_check::recipe::CommandExtractor;
use upstream_check::scan;

#[derive(Parser)]
#[command(name = "upstream-check")]
#[command(version, about = "Probe upstream download URLs for newer package versions")]
struct Cli {
    /// Show per-package diagnostics
    #[arg(short, long)]
    verbose: bool,

    /// Number of concurrent workers
    #[arg(long = "threads_num", value_name = "N")]
    threads_num: Option<usize>,

    /// Scan the system package-recipe tree
    #[arg(long)]
    abs: bool,

    /// Scan recipes under DIR
    #[arg(short = 'd', value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Config file (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only check these packages
    packages: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.verbose);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

fn init_tracing(verbose: bool) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
    let default_filter = if verbose { "upstream_check=debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(writer)
        .with_target(false)
        .init();

    guard
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let file_config = config::load(cli.config.as_deref()).map_err(scan::ScanError::from)?;
    let root = scan::resolve_root(cli.abs, cli.dir, file_config.scan.root.clone())?;

    let mut config = ScanConfig::from_file_config(file_config, root);
    config.verbose = cli.verbose;
    config.whitelist = cli.packages;
    if let Some(threads) = cli.threads_num {
        config.threads = threads;
    }

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted; cancelling outstanding probes");
                cancel.cancel();
            }
        }
    });

    let (logger, output) = Logger::spawn(tokio::io::stdout(), config.verbose);
    let result = scan::run(
        &config,
        Arc::new(CommandExtractor::new(&config.extractor)),
        Arc::new(DefaultProber::new(&config.probe)),
        logger,
        cancel,
    )
    .await;
    output.finish().await?;

    result?;
    Ok(())
}
