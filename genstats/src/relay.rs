//! Byte relay.
//!
//! Copies everything read from a reader into a [`Sink`], unmodified. This is
//! what the `tcpcat` binary does with standard input, so that generator
//! output captured to a file can be replayed against a receiver.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::{debug, warn};

use crate::sink::{self, Sink};

const READ_CHUNK: usize = 8 * 1024;

#[derive(thiserror::Error, Debug)]
/// Errors produced by [`relay`]
pub enum Error {
    /// Reading from the source failed
    #[error("Failed to read relay input: {0}")]
    Read(#[source] Box<io::Error>),
    /// See [`crate::sink::Error`] for details.
    #[error(transparent)]
    Sink(#[from] sink::Error),
}

/// Copy `reader` into `sink` until end of input, then flush. Returns the
/// number of bytes copied.
///
/// # Errors
///
/// Returns an error if reading or writing fails. On a read failure whatever
/// the sink holds is flushed, best effort, before returning.
pub async fn relay<R, W>(mut reader: R, sink: &mut Sink<W>) -> Result<u64, Error>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0; READ_CHUNK];
    let mut total: u64 = 0;
    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                if let Err(err) = sink.flush().await {
                    warn!("Flush after failed read also failed: {err}");
                }
                return Err(Error::Read(Box::new(source)));
            }
        };
        total += sink.write(&buf[..n]).await? as u64;
    }
    sink.flush().await?;
    debug!("Relayed {total} bytes to {name}", name = sink.name());
    Ok(total)
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        pin::Pin,
        task::{Context, Poll},
    };

    use tokio::io::{AsyncRead, ReadBuf};

    use super::{Error, relay};
    use crate::sink::{self, Sink, test::Limited};

    /// Yields `data` once, then fails.
    struct Broken {
        data: Option<Vec<u8>>,
    }

    impl AsyncRead for Broken {
        fn poll_read(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            match self.data.take() {
                Some(data) => {
                    buf.put_slice(&data);
                    Poll::Ready(Ok(()))
                }
                None => Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "gone",
                ))),
            }
        }
    }

    #[tokio::test]
    async fn copies_input_verbatim() {
        let input: Vec<u8> = (0..50_000_u32).map(|i| (i % 251) as u8).collect();
        let mut sink = Sink::new("vec", Vec::new(), 1024);

        let copied = relay(input.as_slice(), &mut sink).await.expect("relay");

        assert_eq!(copied, input.len() as u64);
        assert_eq!(sink.get_ref(), &input);
    }

    #[tokio::test]
    async fn empty_input_copies_nothing() {
        let mut sink = Sink::new("vec", Vec::new(), 1024);
        let copied = relay(&b""[..], &mut sink).await.expect("relay");
        assert_eq!(copied, 0);
        assert!(sink.get_ref().is_empty());
    }

    #[tokio::test]
    async fn read_failure_flushes_what_was_read() {
        let reader = Broken {
            data: Some(b"a:1|g\n".to_vec()),
        };
        let mut sink = Sink::new("vec", Vec::new(), 1024);

        let res = relay(reader, &mut sink).await;

        assert!(matches!(res, Err(Error::Read(_))));
        assert_eq!(sink.get_ref().as_slice(), b"a:1|g\n");
    }

    #[tokio::test]
    async fn write_failure_is_an_error() {
        let input = vec![b'x'; 4096];
        let mut sink = Sink::new("limited", Limited::new(100), 64);

        let res = relay(input.as_slice(), &mut sink).await;
        assert!(matches!(
            res,
            Err(Error::Sink(sink::Error::WriteFailed { .. }))
        ));
    }
}
