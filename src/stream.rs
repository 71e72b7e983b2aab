//! TCP stream
use crate::error::Error;
use log::{debug, trace};
use std::{
    io::{self, Read, Write},
    net::{TcpStream, ToSocketAddrs},
    time::{Duration, Instant},
};

const BUF_SIZE: usize = 16 * 1024;

/// Owned TCP connection used for a single round trip.
///
/// The exchange deadline starts when the connection is established. Every
/// write and read afterwards is bounded by the time left until that deadline.
/// A timeout too large to be represented as an `Instant` leaves the exchange
/// unbounded. The socket is closed when the `Stream` is dropped.
#[derive(Debug)]
pub struct Stream {
    inner: TcpStream,
    timeout: Duration,
    deadline: Option<Instant>,
}

impl Stream {
    /// Opens a TCP connection to `host:port`, giving up after `timeout`.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Stream, Error> {
        let inner = connect_with_timeout(host, port, timeout)
            .map_err(|e| classify(e, "connect did not complete in time"))?;

        debug!(
            "connected to {}",
            inner
                .peer_addr()
                .map(|a| a.to_string())
                .unwrap_or_else(|_| format!("{}:{}", host, port))
        );

        Ok(Stream {
            inner,
            timeout,
            deadline: Instant::now().checked_add(timeout),
        })
    }

    /// Writes the whole message, retrying partial writes, and flushes it.
    pub fn send_all(&mut self, msg: &[u8]) -> Result<(), Error> {
        let left = self.remaining("request could not be sent in time")?;
        self.inner.set_write_timeout(Some(left))?;

        self.inner
            .write_all(msg)
            .and_then(|_| self.inner.flush())
            .map_err(|e| classify(e, "request could not be sent in time"))?;

        debug!("sent {} bytes", msg.len());
        Ok(())
    }

    /// Reads until the peer closes the connection and returns everything received.
    ///
    /// Fails with a timeout if the peer is still connected when the deadline passes,
    /// even if some bytes have already arrived.
    pub fn read_to_close(&mut self) -> Result<Vec<u8>, Error> {
        let mut received = Vec::new();
        let mut buf = vec![0; BUF_SIZE];

        loop {
            let left = self.remaining("peer did not close the connection in time")?;
            self.inner.set_read_timeout(Some(left))?;

            match self.inner.read(&mut buf) {
                Ok(0) => break,
                Ok(len) => {
                    trace!("read {} bytes", len);
                    received.extend_from_slice(&buf[..len]);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(classify(e, "peer did not close the connection in time")),
            }
        }

        debug!("received {} bytes", received.len());
        Ok(received)
    }

    fn remaining(&self, what: &'static str) -> Result<Duration, Error> {
        let deadline = match self.deadline {
            Some(deadline) => deadline,
            None => return Ok(self.timeout),
        };

        deadline
            .checked_duration_since(Instant::now())
            .filter(|left| !left.is_zero())
            .ok_or(Error::Timeout(what))
    }
}

///Connects to target host with a timeout.
///
///Tries every resolved address in order. A timeout on any of them is returned
///immediately, other failures fall through to the next address.
pub fn connect_with_timeout<T, U>(host: T, port: u16, timeout: U) -> io::Result<TcpStream>
where
    Duration: From<U>,
    T: AsRef<str>,
{
    let host = host.as_ref();
    let timeout = Duration::from(timeout);
    let addrs: Vec<_> = (host, port).to_socket_addrs()?.collect();
    let count = addrs.len();

    for (idx, addr) in addrs.into_iter().enumerate() {
        debug!("connecting to {}", addr);

        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(err) => match err.kind() {
                io::ErrorKind::TimedOut => return Err(err),
                _ => {
                    if idx + 1 == count {
                        return Err(err);
                    }
                }
            },
        };
    }

    Err(io::Error::new(
        io::ErrorKind::AddrNotAvailable,
        format!("Could not resolve address for {:?}", host),
    ))
}

fn classify(err: io::Error, what: &'static str) -> Error {
    match err.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => Error::Timeout(what),
        _ => Error::Connection(err),
    }
}
