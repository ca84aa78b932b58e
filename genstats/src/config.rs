//! This module controls configuration parsing from the end user. Every field
//! has a default so genstats runs with no configuration at all; a YAML file or
//! the `GENSTATS_CONFIG` environment variable may override any of them.

use std::{
    env, fs, io,
    num::{NonZeroU32, NonZeroUsize},
    path::{Path, PathBuf},
};

use byte_unit::Byte;
use rand::{SeedableRng, rngs::SmallRng};
use serde::Deserialize;
use tracing::debug;

/// Environment variable holding YAML configuration contents. Takes
/// precedence over any configuration file.
pub const CONFIG_ENV_VAR: &str = "GENSTATS_CONFIG";

/// Errors produced by [`Config`]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Error for a serde [`serde_yaml`].
    #[error("Failed to deserialize yaml: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),
    /// Error reading config file
    #[error("Failed to read config file {path:?}: {source}")]
    ReadFile {
        /// File path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: Box<io::Error>,
    },
    /// The sink buffer capacity does not fit in memory
    #[error("Buffer capacity {0} is too large")]
    BufferCapacity(Byte),
}

fn default_dictionary_path() -> PathBuf {
    PathBuf::from("words.gz")
}

fn default_key_pool_size() -> NonZeroUsize {
    NonZeroUsize::MIN.saturating_add(99)
}

fn default_max_key_attempts() -> NonZeroU32 {
    NonZeroU32::MIN.saturating_add(9_999)
}

fn default_buffer_capacity() -> Byte {
    Byte::from_u64(8 * 1024)
}

/// Main configuration struct for this program
#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Path of the gzip compressed, newline delimited word list
    #[serde(default = "default_dictionary_path")]
    pub dictionary_path: PathBuf,
    /// Number of unique keys cycled through during a run
    #[serde(default = "default_key_pool_size")]
    pub key_pool_size: NonZeroUsize,
    /// Colliding key candidates discarded before key generation gives up
    #[serde(default = "default_max_key_attempts")]
    pub max_key_attempts: NonZeroU32,
    /// Size of the write buffer in front of stdout or the socket
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: Byte,
    /// Seed for key selection and gauge values. When absent the seed comes
    /// from the operating system and every run differs.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dictionary_path: default_dictionary_path(),
            key_pool_size: default_key_pool_size(),
            max_key_attempts: default_max_key_attempts(),
            buffer_capacity: default_buffer_capacity(),
            seed: None,
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// The contents of [`CONFIG_ENV_VAR`] win if set, then the file at
    /// `path` if given, otherwise [`Config::default`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the YAML is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        if let Ok(contents) = env::var(CONFIG_ENV_VAR) {
            debug!("Using config from env var '{CONFIG_ENV_VAR}'");
            return Self::parse(&contents);
        }
        match path {
            Some(path) => {
                debug!("Attempting to open configuration file at: {}", path.display());
                let contents = fs::read_to_string(path).map_err(|source| Error::ReadFile {
                    path: path.to_path_buf(),
                    source: Box::new(source),
                })?;
                Self::parse(&contents)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse YAML configuration contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or names an unknown field.
    pub fn parse(contents: &str) -> Result<Self, Error> {
        // An empty document is the default configuration.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }

    /// The sink buffer capacity in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the capacity does not fit in a `usize`.
    pub fn buffer_capacity_bytes(&self) -> Result<usize, Error> {
        usize::try_from(self.buffer_capacity.as_u64())
            .map_err(|_| Error::BufferCapacity(self.buffer_capacity))
    }

    /// A random number generator seeded per [`Config::seed`].
    #[must_use]
    pub fn rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Write, num::NonZeroUsize, path::PathBuf};

    use byte_unit::Byte;
    use rand::Rng;

    use super::Config;

    #[test]
    fn empty_contents_are_default() {
        assert_eq!(Config::parse("").expect("parse"), Config::default());
        assert_eq!(Config::parse("\n  \n").expect("parse"), Config::default());
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.dictionary_path, PathBuf::from("words.gz"));
        assert_eq!(config.key_pool_size.get(), 100);
        assert_eq!(config.max_key_attempts.get(), 10_000);
        assert_eq!(config.buffer_capacity_bytes().expect("capacity"), 8192);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let contents = r#"
key_pool_size: 250
seed: 42
"#;
        let config = Config::parse(contents).expect("parse");
        assert_eq!(config.key_pool_size, NonZeroUsize::new(250).expect("non-zero"));
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.dictionary_path, PathBuf::from("words.gz"));
        assert_eq!(config.buffer_capacity, Byte::from_u64(8192));
    }

    #[test]
    fn buffer_capacity_accepts_units() {
        let config = Config::parse("buffer_capacity: \"64 KiB\"").expect("parse");
        assert_eq!(config.buffer_capacity_bytes().expect("capacity"), 64 * 1024);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(Config::parse("key_pool: 10").is_err());
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        assert!(Config::parse("key_pool_size: 0").is_err());
    }

    #[test]
    fn file_is_read_when_given() {
        let mut fp = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(fp, "dictionary_path: /tmp/other.gz").expect("write");
        fp.flush().expect("flush");
        let config = Config::load(Some(fp.path())).expect("load");
        assert_eq!(config.dictionary_path, PathBuf::from("/tmp/other.gz"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let res = Config::load(Some(&dir.path().join("genstats.yaml")));
        assert!(matches!(res, Err(super::Error::ReadFile { .. })));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let config = Config {
            seed: Some(7),
            ..Config::default()
        };
        let a: u64 = config.rng().random();
        let b: u64 = config.rng().random();
        assert_eq!(a, b);
    }
}
