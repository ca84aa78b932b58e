use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;
use genstats::{
    config::{self, Config},
    generator::{self, stdout::Stdout, tcp::Tcp},
};
use genstats_payload::WordDictionary;
use jemallocator::Jemalloc;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::{runtime::Builder, signal, task::JoinError};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(thiserror::Error, Debug)]
enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::Error),
    #[error("Generator returned an error: {0}")]
    Generator(#[from] generator::Error),
    #[error("Generator task failed: {0}")]
    Join(#[from] JoinError),
    #[error("Failed to install prometheus exporter: {0}")]
    Prometheus(#[from] metrics_exporter_prometheus::BuildError),
    #[error("A target address is required unless --stdout is given")]
    MissingAddr,
}

#[derive(Parser, Debug)]
#[clap(version, about = "Flood a statsd receiver with gauge lines and report throughput")]
struct Cli {
    /// write gauge lines to standard output instead of a TCP target
    #[clap(long)]
    stdout: bool,
    /// path on disk to the configuration file, overridden by `GENSTATS_CONFIG`
    #[clap(long)]
    config_path: Option<PathBuf>,
    /// address to bind a prometheus exporter to
    #[clap(long)]
    prometheus_addr: Option<SocketAddr>,
    /// statsd receiver address, `host:port`
    #[clap(required_unless_present = "stdout")]
    addr: Option<String>,
}

async fn inner_main(cli: Cli, config: Config) -> Result<(), Error> {
    if let Some(addr) = cli.prometheus_addr {
        PrometheusBuilder::new().with_http_listener(addr).install()?;
        info!("Prometheus exporter listening on {addr}");
    }

    let dictionary = WordDictionary::new(config.dictionary_path.clone());

    if cli.stdout {
        Stdout::new(&config, &dictionary)?.spin().await?;
        return Ok(());
    }

    let addr = cli.addr.ok_or(Error::MissingAddr)?;
    let (watcher, broadcaster) = genstats_signal::signal();
    let tcp = Tcp::new(&addr, &config, &dictionary, watcher)?;
    let mut handle = tokio::spawn(tcp.spin());

    tokio::select! {
        res = signal::ctrl_c() => {
            res?;
            info!("stopping...");
            broadcaster.signal_and_wait().await;
            handle.await??;
        },
        res = &mut handle => {
            // The generator only finishes on its own when it fails.
            res??;
        }
    }
    Ok(())
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .finish()
        .init();

    let cli = Cli::parse();
    let version = env!("CARGO_PKG_VERSION");
    info!("Starting genstats {version} run.");

    let config = Config::load(cli.config_path.as_deref()).map_err(|err| {
        error!("{err}");
        Error::from(err)
    })?;

    let runtime = Builder::new_multi_thread().enable_all().build()?;
    let res = runtime.block_on(inner_main(cli, config));
    if let Err(err) = &res {
        error!("genstats failed: {err}");
    }
    res
}
