//! The word dictionary metric names are built from.
//!
//! The dictionary is a gzip compressed, newline delimited list of words. It
//! is read once, on first use, and cached for the life of the
//! [`WordDictionary`]. Callers always receive their own copy of the cached
//! words.

use std::{
    fs::File,
    io::{self, BufReader, Read},
    path::{Path, PathBuf},
};

use flate2::read::MultiGzDecoder;
use once_cell::sync::OnceCell;
use tracing::info;

/// Errors produced by [`WordDictionary`]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The dictionary file could not be opened
    #[error("Failed to open word dictionary {path:?}: {source}")]
    Open {
        /// Dictionary path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: Box<io::Error>,
    },
    /// The dictionary file could not be decompressed or was not UTF-8
    #[error("Failed to decompress word dictionary {path:?}: {source}")]
    Decompress {
        /// Dictionary path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: Box<io::Error>,
    },
    /// The dictionary held no words
    #[error("Word dictionary {path:?} contains no words")]
    Empty {
        /// Dictionary path
        path: PathBuf,
    },
}

/// A lazily loaded, sorted list of words.
///
/// The first call to [`WordDictionary::load`] reads the file. Concurrent
/// callers block until that read completes and then all observe its result.
/// If the read fails nothing is cached and the next call tries again, though
/// genstats treats the first failure as fatal.
#[derive(Debug)]
pub struct WordDictionary {
    path: PathBuf,
    words: OnceCell<Vec<String>>,
}

impl WordDictionary {
    /// Create a dictionary backed by the gzip file at `path`. No IO happens
    /// until [`WordDictionary::load`] is called.
    #[must_use]
    pub fn new<P>(path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            path: path.into(),
            words: OnceCell::new(),
        }
    }

    /// Create a dictionary from words already in memory.
    ///
    /// The words are cleaned up exactly as a file would be: trimmed, empty
    /// entries dropped, sorted.
    #[must_use]
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        words.sort_unstable();

        Self {
            path: PathBuf::new(),
            words: OnceCell::with_value(words),
        }
    }

    /// The path this dictionary reads from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return a copy of the sorted words, reading the file on first call.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is not valid gzip, is
    /// not UTF-8 or contains no words.
    pub fn load(&self) -> Result<Vec<String>, Error> {
        let words = self.words.get_or_try_init(|| self.read())?;
        Ok(words.clone())
    }

    fn read(&self) -> Result<Vec<String>, Error> {
        let fp = File::open(&self.path).map_err(|source| Error::Open {
            path: self.path.clone(),
            source: Box::new(source),
        })?;
        let words = parse(BufReader::new(fp)).map_err(|source| Error::Decompress {
            path: self.path.clone(),
            source: Box::new(source),
        })?;
        if words.is_empty() {
            return Err(Error::Empty {
                path: self.path.clone(),
            });
        }
        info!(
            "Loaded {count} words from {path}",
            count = words.len(),
            path = self.path.display()
        );
        Ok(words)
    }
}

/// Decompress `reader` and split it into sorted, trimmed, non-empty words.
///
/// # Errors
///
/// Returns an error if the stream is not gzip or does not decompress to
/// UTF-8.
pub fn parse<R>(reader: R) -> Result<Vec<String>, io::Error>
where
    R: Read,
{
    let mut contents = String::new();
    MultiGzDecoder::new(reader).read_to_string(&mut contents)?;

    let mut words: Vec<String> = contents
        .split('\n')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect();
    words.sort_unstable();
    Ok(words)
}
