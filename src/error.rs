// Error types surfaced to the caller of the solver binary.

use std::fmt;
use std::io;

#[derive(Debug)]
pub enum Error {
    /// Malformed instance file, with the 1-based line the problem was found on.
    Parse { line: usize, reason: String },
    /// Structural violation discovered after parsing.
    InvalidInstance(String),
    /// An output path could not be written or an input path could not be read.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse { line, reason } => write!(f, "parse error on line {line}: {reason}"),
            Error::InvalidInstance(reason) => write!(f, "invalid instance: {reason}"),
            Error::Io(why) => write!(f, "io error: {why}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(why) => Some(why),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(why: io::Error) -> Self {
        Error::Io(why)
    }
}

impl From<csv::Error> for Error {
    fn from(why: csv::Error) -> Self {
        match why.into_kind() {
            csv::ErrorKind::Io(why) => Error::Io(why),
            other => Error::Io(io::Error::other(format!("{other:?}"))),
        }
    }
}
