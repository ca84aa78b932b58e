//! The write loop.
//!
//! A [`Worker`] owns everything the loop touches: the key pool, the sink, the
//! encode buffer, the random source and the run counters. Nothing here is
//! shared with another task, so the loop takes no locks. Each iteration picks
//! the next key from the pool in index order, encodes a gauge line into the
//! reused buffer and writes it through the sink.
//!
//! ## Metrics
//!
//! `bytes_written`: Bytes sent successfully
//! `packets_sent`: Gauge lines sent successfully
//!
//! Both are published in batches of [`TELEMETRY_INTERVAL`] lines and once more
//! when the loop stops.

use std::time::{Duration, Instant};

use genstats_payload::{KeyPool, gauge};
use genstats_signal::Watcher;
use metrics::counter;
use rand::{Rng, rngs::SmallRng};
use tokio::io::AsyncWrite;

use crate::sink::{self, Sink};

/// Lines written between telemetry updates and cooperative yields.
pub const TELEMETRY_INTERVAL: u64 = 1024;

#[derive(Debug, Clone, Copy)]
/// Accumulated results of one run.
pub struct RunCounters {
    /// Gauge lines written successfully
    pub operations: u64,
    /// Bytes written successfully
    pub bytes: u64,
    /// When the loop started
    pub started: Instant,
    /// Wall-clock time from start until the loop observed the stop signal
    pub elapsed: Duration,
}

impl RunCounters {
    fn start() -> Self {
        Self {
            operations: 0,
            bytes: 0,
            started: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    #[inline]
    fn record(&mut self, bytes: usize) {
        self.operations += 1;
        self.bytes += bytes as u64;
    }

    fn stop(&mut self) {
        self.elapsed = self.started.elapsed();
    }
}

#[derive(Debug)]
struct Telemetry {
    labels: Vec<(String, String)>,
    operations: u64,
    bytes: u64,
}

impl Telemetry {
    fn new(component_name: &str) -> Self {
        Self {
            labels: vec![
                ("component".to_string(), "generator".to_string()),
                ("component_name".to_string(), component_name.to_string()),
            ],
            operations: 0,
            bytes: 0,
        }
    }

    fn publish(&mut self, counters: &RunCounters) {
        counter!("packets_sent", &self.labels).increment(counters.operations - self.operations);
        counter!("bytes_written", &self.labels).increment(counters.bytes - self.bytes);
        self.operations = counters.operations;
        self.bytes = counters.bytes;
    }
}

#[derive(Debug)]
/// Drives gauge lines from a [`KeyPool`] into a [`Sink`].
pub struct Worker<W> {
    pool: KeyPool,
    sink: Sink<W>,
    rng: SmallRng,
    buf: Vec<u8>,
    index: u64,
    counters: RunCounters,
    telemetry: Telemetry,
}

impl<W> Worker<W>
where
    W: AsyncWrite + Unpin,
{
    /// Create a new [`Worker`]. `component_name` labels this worker's
    /// telemetry.
    #[must_use]
    pub fn new(pool: KeyPool, sink: Sink<W>, rng: SmallRng, component_name: &str) -> Self {
        // Sized for the longest possible line so encoding never reallocates.
        let capacity = pool
            .keys()
            .iter()
            .map(|key| gauge::max_encoded_len(key))
            .max()
            .unwrap_or_default();

        Self {
            pool,
            sink,
            rng,
            buf: Vec::with_capacity(capacity),
            index: 0,
            counters: RunCounters::start(),
            telemetry: Telemetry::new(component_name),
        }
    }

    /// Write random gauge values until `shutdown` is signalled.
    ///
    /// The signal is polled without blocking before every line. Once it is
    /// seen the clock stops, the sink is flushed and the counters are returned
    /// along with the underlying stream. The caller acknowledges the signal,
    /// typically by dropping `shutdown` once it has reported.
    ///
    /// # Errors
    ///
    /// Returns an error if any write or the final flush fails. There is no
    /// retry: a failed transport invalidates the measurement.
    pub async fn run(mut self, shutdown: &mut Watcher) -> Result<(RunCounters, W), sink::Error> {
        self.counters = RunCounters::start();
        loop {
            if shutdown.try_recv() {
                self.counters.stop();
                break;
            }
            let value = self.rng.random::<u64>();
            self.step(value).await?;
        }
        self.telemetry.publish(&self.counters);
        let inner = self.sink.close().await?;
        Ok((self.counters, inner))
    }

    /// Write gauge lines forever, the value of each line being its iteration
    /// index. There is no stop signal; the loop ends only when a write fails
    /// or the process is terminated from outside.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails.
    pub async fn run_unbounded(mut self) -> Result<(), sink::Error> {
        self.counters = RunCounters::start();
        loop {
            let value = self.index;
            self.step(value).await?;
        }
    }

    #[inline]
    async fn step(&mut self, value: u64) -> Result<(), sink::Error> {
        let key = self.pool.cycle(self.index);
        self.index = self.index.wrapping_add(1);

        self.buf.clear();
        let line = gauge::encode(&mut self.buf, key, value);
        let written = self.sink.write(line).await?;
        self.counters.record(written);

        if self.counters.operations % TELEMETRY_INTERVAL == 0 {
            self.telemetry.publish(&self.counters);
            // A sink that is always ready never yields on its own.
            tokio::task::yield_now().await;
        }
        Ok(())
    }
}
