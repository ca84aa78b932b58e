//! The genstats payloads
//!
//! This library supplies everything the genstats write loop needs before it
//! touches a socket: the word dictionary metric names are drawn from, the
//! pool of unique keys built from it, and the encoder that renders a gauge
//! line into a reusable buffer.

#![deny(clippy::all)]
#![deny(clippy::cargo)]
#![deny(clippy::pedantic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]
#![deny(clippy::unwrap_used)]
#![deny(unused_extern_crates)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![allow(clippy::multiple_crate_versions)]

pub mod dictionary;
pub mod gauge;
pub mod keys;

pub use dictionary::WordDictionary;
pub use keys::{KeyGenerator, KeyPool};

/// Errors produced while preparing payloads
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// See [`dictionary::Error`]
    #[error(transparent)]
    Dictionary(#[from] dictionary::Error),
    /// See [`keys::Error`]
    #[error(transparent)]
    Keys(#[from] keys::Error),
}
