use std::fmt::{self, Display};
use std::io;

use crate::kind::Kind;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    UnexpectedEnd,
    InvalidTagKind(u8),
    InvalidEncoding(&'static str),
    DuplicateName(String),
    ListContentMismatch { declared: Kind, found: Kind },
    ValueOutOfRange(&'static str),
    FormatError(String),
    Io(io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnexpectedEnd => f.write_str("unexpected end of stream"),
            Error::InvalidTagKind(byte) => write!(f, "invalid tag kind byte: {}", byte),
            Error::InvalidEncoding(detail) => write!(f, "invalid modified UTF-8: {}", detail),
            Error::DuplicateName(name) => write!(f, "duplicate name in compound: {:?}", name),
            Error::ListContentMismatch { declared, found } => write!(
                f,
                "list declared content-kind {} but found {}",
                declared, found
            ),
            Error::ValueOutOfRange(detail) => write!(f, "value out of range: {}", detail),
            Error::FormatError(detail) => write!(f, "format error: {}", detail),
            Error::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        if value.kind() == io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEnd
        } else {
            Error::Io(value)
        }
    }
}
