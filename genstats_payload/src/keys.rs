//! Metric key generation.
//!
//! A key is between one and [`MAX_WORDS`] dictionary words joined by
//! [`SEPARATOR`]. A [`KeyGenerator`] remembers every key it has produced and
//! never produces the same key twice. A [`KeyPool`] is a fixed set of such
//! keys, built once and cycled through for the rest of a run.

use std::num::{NonZeroU32, NonZeroUsize};

use rand::Rng;
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::dictionary::WordDictionary;

/// Joins the words of a key.
pub const SEPARATOR: char = '_';
/// Maximum number of words in a key.
pub const MAX_WORDS: usize = 5;

/// Errors produced by [`KeyGenerator`]
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// There are no words to build keys from
    #[error("Cannot generate keys from an empty dictionary")]
    EmptyDictionary,
    /// Every attempt produced a key that had already been generated
    #[error("Key space exhausted: no unique key found after {attempts} attempts")]
    Exhausted {
        /// Number of candidates tried
        attempts: u32,
    },
}

#[derive(Debug)]
/// Produces unique keys from a word list.
pub struct KeyGenerator {
    words: Vec<String>,
    seen: FxHashSet<String>,
    max_attempts: NonZeroU32,
}

impl KeyGenerator {
    /// Create a new [`KeyGenerator`].
    ///
    /// `max_attempts` bounds how many colliding candidates a single call to
    /// [`KeyGenerator::key`] will discard before giving up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyDictionary`] if `words` is empty.
    pub fn new(words: Vec<String>, max_attempts: NonZeroU32) -> Result<Self, Error> {
        if words.is_empty() {
            return Err(Error::EmptyDictionary);
        }
        Ok(Self {
            words,
            seen: FxHashSet::default(),
            max_attempts,
        })
    }

    /// Create a new [`KeyGenerator`] over the words of `dictionary`, loading
    /// it if this is its first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the dictionary cannot be loaded or is empty.
    pub fn from_dictionary(
        dictionary: &WordDictionary,
        max_attempts: NonZeroU32,
    ) -> Result<Self, crate::Error> {
        let words = dictionary.load()?;
        Ok(Self::new(words, max_attempts)?)
    }

    /// Generate a key that this generator has not produced before.
    ///
    /// Word count is uniform in `1..=MAX_WORDS` and each word is uniform over
    /// the whole dictionary.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exhausted`] if `max_attempts` candidates in a row
    /// were all previously generated.
    pub fn key<R>(&mut self, rng: &mut R) -> Result<String, Error>
    where
        R: Rng + ?Sized,
    {
        for _ in 0..self.max_attempts.get() {
            let total_words = rng.random_range(1..=MAX_WORDS);
            let mut key = String::new();
            for i in 0..total_words {
                if i > 0 {
                    key.push(SEPARATOR);
                }
                let idx = rng.random_range(0..self.words.len());
                key.push_str(&self.words[idx]);
            }
            if !self.seen.contains(&key) {
                self.seen.insert(key.clone());
                return Ok(key);
            }
        }
        Err(Error::Exhausted {
            attempts: self.max_attempts.get(),
        })
    }

    /// Generate `size` unique keys, in generation order.
    ///
    /// # Errors
    ///
    /// See [`KeyGenerator::key`].
    pub fn pool<R>(&mut self, rng: &mut R, size: NonZeroUsize) -> Result<KeyPool, Error>
    where
        R: Rng + ?Sized,
    {
        let mut keys = Vec::with_capacity(size.get());
        for _ in 0..size.get() {
            keys.push(self.key(rng)?);
        }
        debug!("Generated key pool of {size} keys");
        Ok(KeyPool { keys })
    }
}

#[derive(Debug, Clone)]
/// A fixed, non-empty set of unique keys.
pub struct KeyPool {
    keys: Vec<String>,
}

impl KeyPool {
    /// The key for iteration `idx`, cycling through the pool in order.
    #[inline]
    #[must_use]
    pub fn cycle(&self, idx: u64) -> &str {
        // The pool is never empty and its length fits comfortably in a u64.
        let len = self.keys.len() as u64;
        #[allow(clippy::cast_possible_truncation)]
        let pos = (idx % len) as usize;
        &self.keys[pos]
    }

    /// Number of keys in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Always false, a pool holds at least one key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The keys, in generation order.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}
