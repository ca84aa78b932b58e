use clap::Parser;
use genstats::{
    relay,
    sink::{self, DEFAULT_CAPACITY, Sink},
};
use tokio::runtime::Builder;
use tracing::{Subscriber, error, info};
use tracing_subscriber::{EnvFilter, fmt::MakeWriter, util::SubscriberInitExt};

#[derive(thiserror::Error, Debug)]
enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Sink(#[from] sink::Error),
    #[error(transparent)]
    Relay(#[from] relay::Error),
}

#[derive(Parser, Debug)]
#[clap(version, about = "Copy standard input to a TCP address")]
struct Cli {
    /// target address, `host:port`
    addr: String,
}

async fn inner_main(cli: Cli) -> Result<(), Error> {
    let mut sink = Sink::connect(&cli.addr, DEFAULT_CAPACITY).await?;
    let copied = relay::relay(tokio::io::stdin(), &mut sink).await?;
    drop(sink.close().await?);
    info!("Copied {copied} bytes to {addr}", addr = cli.addr);
    Ok(())
}

fn subscriber<W>(writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(writer)
        .finish()
}

fn main() -> Result<(), Error> {
    subscriber(std::io::stderr).init();

    let cli = Cli::parse();
    let runtime = Builder::new_multi_thread().enable_all().build()?;
    let res = runtime.block_on(inner_main(cli));
    if let Err(err) = &res {
        error!("tcpcat failed: {err}");
    }
    res
}
