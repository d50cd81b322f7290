// error.rs
//
// Copyright (c) 2026  gifcut developers
//
use std::fmt;
use std::io;

/// Errors encountered while parsing, transforming or saving
#[derive(Debug)]
pub enum Error {
    /// A wrapped I/O error.
    Io(io::Error),
    /// A wrapped error from the raster library.
    Image(image::ImageError),
    /// A fixed-length field runs past the end of the data.
    UnexpectedEndOfData,
    /// [Header](block/struct.Header.html) signature is not `GIF`.
    MalformedHeader,
    /// GIF version not supported (87a or 89a only).
    UnsupportedVersion([u8; 3]),
    /// Raster round-trip produced an invalid or unsupported GIF.
    InvalidImage,
    /// No path given for saving.
    MissingPath,
}

/// Gifcut result type
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(fmt),
            Error::Image(err) => err.fmt(fmt),
            Error::InvalidImage => write!(fmt, "invalid or unsupported GIF"),
            _ => fmt::Debug::fmt(self, fmt),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            Error::Image(ref err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err)
    }
}
