//! The standard output generator.
//!
//! Writes gauge lines to standard output with no stop signal. The value of
//! each line is its iteration index, so output is reproducible for a given
//! key pool. The process runs until it is killed or standard output goes
//! away, no report is written.
//!
//! Telemetry is emitted by [`crate::driver`] under `component_name` `stdout`.

use genstats_payload::{KeyPool, WordDictionary};
use rand::rngs::SmallRng;
use tracing::error;

use super::{Error, key_pool};
use crate::{config::Config, driver::Worker, sink::Sink};

#[derive(Debug)]
/// The standard output generator.
pub struct Stdout {
    capacity: usize,
    pool: KeyPool,
    rng: SmallRng,
}

impl Stdout {
    /// Create a new [`Stdout`] instance.
    ///
    /// # Errors
    ///
    /// Creation will fail if the dictionary cannot be loaded, the key pool
    /// cannot be filled or the configured buffer capacity is unusable.
    pub fn new(config: &Config, dictionary: &WordDictionary) -> Result<Self, Error> {
        let mut rng = config.rng();
        let pool = key_pool(config, dictionary, &mut rng)?;
        Ok(Self {
            capacity: config.buffer_capacity_bytes()?,
            pool,
            rng,
        })
    }

    /// Run [`Stdout`] until a write fails.
    ///
    /// # Errors
    ///
    /// Function will return an error when standard output rejects a write,
    /// for instance a closed pipe. It never returns otherwise.
    pub async fn spin(self) -> Result<(), Error> {
        let sink = Sink::stdout(self.capacity);
        let worker = Worker::new(self.pool, sink, self.rng, "stdout");
        worker.run_unbounded().await.map_err(|err| {
            error!("Stdout generator stopped: {err}");
            Error::from(err)
        })
    }
}
