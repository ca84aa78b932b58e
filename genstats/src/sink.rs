//! Buffered byte sinks.
//!
//! A [`Sink`] puts a fixed size write buffer in front of standard output or a
//! TCP connection. Writes land in the buffer and reach the underlying stream
//! only when the buffer fills, on [`Sink::flush`] or on [`Sink::close`]. When a
//! write fails the sink makes one attempt to flush whatever it still holds
//! before surfacing the error, so the final partial batch is not silently
//! dropped.

use std::io;

use tokio::{
    io::{AsyncWrite, AsyncWriteExt, BufWriter, Stdout},
    net::{TcpStream, lookup_host},
};
use tracing::{info, warn};

/// Default write buffer size, 8 KiB.
pub const DEFAULT_CAPACITY: usize = 8 * 1024;

#[derive(thiserror::Error, Debug)]
/// Errors produced by [`Sink`].
pub enum Error {
    /// The TCP address could not be resolved
    #[error("Failed to resolve TCP address {addr}: {source}")]
    Resolve {
        /// Target address
        addr: String,
        /// Underlying IO error
        #[source]
        source: Box<io::Error>,
    },
    /// The TCP address resolved to nothing
    #[error("TCP address {addr} did not resolve to any socket address")]
    NoAddress {
        /// Target address
        addr: String,
    },
    /// Error connecting to TCP endpoint
    #[error("Failed to connect to TCP address {addr}: {source}")]
    ConnectionFailed {
        /// Target address
        addr: String,
        /// Underlying IO error
        #[source]
        source: Box<io::Error>,
    },
    /// Error writing to the sink
    #[error("Failed to write to {name}: {source}")]
    WriteFailed {
        /// Sink name, `stdout` or the target address
        name: String,
        /// Underlying IO error
        #[source]
        source: Box<io::Error>,
    },
    /// Error flushing the sink
    #[error("Failed to flush {name}: {source}")]
    FlushFailed {
        /// Sink name, `stdout` or the target address
        name: String,
        /// Underlying IO error
        #[source]
        source: Box<io::Error>,
    },
}

#[derive(Debug)]
/// A buffered destination for encoded lines.
pub struct Sink<W> {
    name: String,
    inner: BufWriter<W>,
}

impl Sink<Stdout> {
    /// Buffer standard output. Closing this sink flushes but never closes the
    /// process' standard output.
    #[must_use]
    pub fn stdout(capacity: usize) -> Self {
        Self::new("stdout", tokio::io::stdout(), capacity)
    }
}

impl Sink<TcpStream> {
    /// Resolve `addr`, connect to the first address it resolves to and buffer
    /// the connection. The connection is closed when the sink, or the stream
    /// returned by [`Sink::close`], is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if `addr` does not resolve or the connection fails.
    pub async fn connect(addr: &str, capacity: usize) -> Result<Self, Error> {
        let peer = lookup_host(addr)
            .await
            .map_err(|source| Error::Resolve {
                addr: addr.to_string(),
                source: Box::new(source),
            })?
            .next()
            .ok_or_else(|| Error::NoAddress {
                addr: addr.to_string(),
            })?;

        let stream = TcpStream::connect(peer)
            .await
            .map_err(|source| Error::ConnectionFailed {
                addr: addr.to_string(),
                source: Box::new(source),
            })?;
        info!("Connected to {peer}");

        Ok(Self::new(addr, stream, capacity))
    }
}

impl<W> Sink<W>
where
    W: AsyncWrite + Unpin,
{
    /// Put a write buffer of `capacity` bytes in front of `inner`. `name`
    /// identifies the sink in errors.
    pub fn new<S>(name: S, inner: W, capacity: usize) -> Self
    where
        S: Into<String>,
    {
        Self {
            name: name.into(),
            inner: BufWriter::with_capacity(capacity, inner),
        }
    }

    /// Write all of `bytes`, returning how many were written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::WriteFailed`] if the underlying stream rejects the
    /// write. Buffered bytes are flushed, best effort, before returning.
    #[inline]
    pub async fn write(&mut self, bytes: &[u8]) -> Result<usize, Error> {
        if let Err(source) = self.inner.write_all(bytes).await {
            if let Err(err) = self.inner.flush().await {
                warn!("Flush after failed write to {name} also failed: {err}", name = self.name);
            }
            return Err(Error::WriteFailed {
                name: self.name.clone(),
                source: Box::new(source),
            });
        }
        Ok(bytes.len())
    }

    /// Push any buffered bytes to the underlying stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FlushFailed`] if the underlying stream rejects the
    /// write.
    pub async fn flush(&mut self) -> Result<(), Error> {
        self.inner
            .flush()
            .await
            .map_err(|source| Error::FlushFailed {
                name: self.name.clone(),
                source: Box::new(source),
            })
    }

    /// Flush and give back the underlying stream.
    ///
    /// # Errors
    ///
    /// See [`Sink::flush`].
    pub async fn close(mut self) -> Result<W, Error> {
        self.flush().await?;
        Ok(self.inner.into_inner())
    }

    /// The name of this sink, `stdout` or the target address.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying stream. Bytes still in the buffer are not visible here.
    #[must_use]
    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }
}
