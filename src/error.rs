//! Resolver errors.

use crate::base::ParseError;
use core::fmt;
use std::io;

//------------ Error ---------------------------------------------------------

/// An error returned by a resolver operation.
#[derive(Debug)]
pub enum Error {
    /// The operation did not finish within the configured timeout.
    Timeout,

    /// The caller's cancellation handle or the resolver fired.
    Cancelled,

    /// An argument was rejected before any network activity.
    Argument(&'static str),

    /// A response was malformed or did not match the query.
    Protocol(ParseError),

    /// A transport operation failed.
    Io(io::Error),
}

impl Error {
    /// Creates a protocol error from a static description.
    pub(crate) fn protocol(msg: &'static str) -> Self {
        Error::Protocol(ParseError::Form(crate::base::FormError::new(msg)))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Timeout => f.write_str("request timed out"),
            Error::Cancelled => f.write_str("request cancelled"),
            Error::Argument(msg) => write!(f, "invalid argument: {}", msg),
            Error::Protocol(ref err) => write!(f, "protocol error: {}", err),
            Error::Io(ref err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::Protocol(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::Protocol(err)
    }
}
