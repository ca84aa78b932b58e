//! The TCP generator.
//!
//! Opens a single connection to the target and writes random gauge values
//! over it until shut down. On shutdown the buffered tail is flushed, the
//! connection closed and a throughput [`Report`] written to standard output.
//!
//! Telemetry is emitted by [`crate::driver`] under `component_name` `tcp`.

use genstats_payload::{KeyPool, WordDictionary};
use genstats_signal::Watcher;
use rand::rngs::SmallRng;
use tracing::{error, info};

use super::{Error, key_pool};
use crate::{config::Config, driver::Worker, report::Report, sink::Sink};

#[derive(Debug)]
/// The TCP generator.
///
/// This generator is responsible for connecting to the target via TCP
pub struct Tcp {
    addr: String,
    capacity: usize,
    pool: KeyPool,
    rng: SmallRng,
    shutdown: Watcher,
}

impl Tcp {
    /// Create a new [`Tcp`] instance targeting `addr`.
    ///
    /// The key pool is built here, so a missing dictionary or an exhausted
    /// key space fails before any connection is attempted.
    ///
    /// # Errors
    ///
    /// Creation will fail if the dictionary cannot be loaded, the key pool
    /// cannot be filled or the configured buffer capacity is unusable.
    pub fn new(
        addr: &str,
        config: &Config,
        dictionary: &WordDictionary,
        shutdown: Watcher,
    ) -> Result<Self, Error> {
        let mut rng = config.rng();
        let pool = key_pool(config, dictionary, &mut rng)?;
        Ok(Self {
            addr: addr.to_string(),
            capacity: config.buffer_capacity_bytes()?,
            pool,
            rng,
            shutdown,
        })
    }

    /// Run [`Tcp`] to completion or until a shutdown signal is received.
    ///
    /// The report is written to standard output before the shutdown signal
    /// is acknowledged, so the process does not exit ahead of it.
    ///
    /// # Errors
    ///
    /// Function will return an error if the connection cannot be made, a
    /// write fails or the report cannot be written.
    pub async fn spin(mut self) -> Result<Report, Error> {
        let sink = Sink::connect(&self.addr, self.capacity).await?;
        let worker = Worker::new(self.pool, sink, self.rng, "tcp");

        let (counters, stream) = match worker.run(&mut self.shutdown).await {
            Ok(res) => res,
            Err(err) => {
                error!("TCP generator stopped: {err}");
                return Err(err.into());
            }
        };
        info!("shutdown signal received");
        drop(stream);

        let report = Report::new(&counters);
        report
            .write_to(std::io::stdout().lock())
            .map_err(Error::Report)?;
        info!(
            operations = report.operations,
            bytes = report.bytes,
            "Run complete in {:?}",
            report.elapsed
        );

        self.shutdown.acknowledge();
        Ok(report)
    }
}
