use std::fmt;

///
/// Problems that can arise in ioprofiler.
///
#[derive(Debug)]
pub enum Error {
    /// A descriptor referenced by the trace has no active record
    NotFound(String),
    ParseError(String),
    InvalidLevel(String),
    InvalidPattern(String),
    Io(std::io::Error),
    Logger(String),
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<std::num::ParseIntError> for Error {
    fn from(err: std::num::ParseIntError) -> Error {
        Error::ParseError(err.to_string())
    }
}

impl From<std::num::ParseFloatError> for Error {
    fn from(err: std::num::ParseFloatError) -> Error {
        Error::ParseError(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Error {
        Error::InvalidPattern(err.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            &Error::NotFound(ref detail) => write!(f, "{} not found", detail),
            &Error::ParseError(ref detail) => write!(f, "could not parse {}", detail),
            &Error::InvalidLevel(ref detail) => write!(f, "Invalid log level: {}", detail),
            &Error::InvalidPattern(ref detail) => write!(f, "invalid filename pattern: {}", detail),
            &Error::Io(ref err) => write!(f, "i/o error: {}", err),
            &Error::Logger(ref detail) => write!(f, "could not set up logging: {}", detail),
        }
    }
}
