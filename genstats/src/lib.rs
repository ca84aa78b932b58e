//! The genstats load generator.
//!
//! This library supports the genstats and tcpcat binaries found elsewhere in
//! this project. genstats floods a statsd receiver, or standard output, with
//! gauge lines as fast as the transport accepts them and reports the
//! throughput it achieved when interrupted.

#![deny(clippy::all)]
#![deny(clippy::cargo)]
#![deny(clippy::pedantic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]
#![deny(clippy::unwrap_used)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::multiple_crate_versions)]

pub mod config;
pub mod driver;
pub mod generator;
pub mod relay;
pub mod report;
pub mod sink;
