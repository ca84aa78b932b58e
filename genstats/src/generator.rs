//! genstats generators
//!
//! A generator builds its key pool from the word dictionary up front, then
//! hands the pool to a [`crate::driver::Worker`] that spams gauge lines into
//! its sink. The key pool is the only thing computed before the loop starts
//! and it is never extended afterward.

use std::io;

use genstats_payload::{KeyGenerator, KeyPool, WordDictionary, keys};
use rand::Rng;
use tracing::info;

use crate::{config::Config, sink};

pub mod stdout;
pub mod tcp;

#[derive(thiserror::Error, Debug)]
/// Errors produced by generators.
pub enum Error {
    /// See [`genstats_payload::Error`] for details.
    #[error(transparent)]
    Payload(#[from] genstats_payload::Error),
    /// See [`genstats_payload::keys::Error`] for details.
    #[error(transparent)]
    Keys(#[from] keys::Error),
    /// See [`crate::sink::Error`] for details.
    #[error(transparent)]
    Sink(#[from] sink::Error),
    /// See [`crate::config::Error`] for details.
    #[error(transparent)]
    Config(#[from] crate::config::Error),
    /// The throughput report could not be written
    #[error("Failed to write throughput report: {0}")]
    Report(#[source] io::Error),
}

/// Build the key pool for one run.
pub(crate) fn key_pool<R>(
    config: &Config,
    dictionary: &WordDictionary,
    rng: &mut R,
) -> Result<KeyPool, Error>
where
    R: Rng + ?Sized,
{
    let mut generator = KeyGenerator::from_dictionary(dictionary, config.max_key_attempts)?;
    let pool = generator.pool(rng, config.key_pool_size)?;
    info!("Built key pool of {size} keys", size = pool.len());
    Ok(pool)
}
