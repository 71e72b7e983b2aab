//! error system used around the library.
use std::io;
use thiserror::Error;

/// Broad category of an [`Error`], used by the command line front end to
/// pick an exit code.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    InvalidArgument,
    Connection,
    Timeout,
}

#[derive(Debug, Error)]
pub enum Error {
    /// The request descriptor was rejected before any socket was opened.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Name resolution, connect or transfer failed.
    #[error("connection error: {0}")]
    Connection(#[source] io::Error),

    /// Connect or exchange did not finish before the deadline.
    #[error("timeout error: {0}")]
    Timeout(&'static str),
}

impl Error {
    pub(crate) fn invalid<T: Into<String>>(msg: T) -> Self {
        Error::InvalidArgument(msg.into())
    }

    ///Returns category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::Connection(_) => ErrorKind::Connection,
            Error::Timeout(_) => ErrorKind::Timeout,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            // Unix reports an expired SO_RCVTIMEO as WouldBlock.
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => {
                Error::Timeout("operation timed out")
            }
            _ => Error::Connection(e),
        }
    }
}
