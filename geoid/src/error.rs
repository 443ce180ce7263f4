//! Error types for the geoid library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or querying a geoid grid.
///
/// Every load failure carries the path of the file it concerns. Grids built
/// from an in-memory buffer report the path as `<memory>`.
#[derive(Error, Debug)]
pub enum GeoidError {
    /// No candidate paths were supplied.
    #[error("No geoid grid candidates given")]
    NoCandidates,

    /// None of the candidate paths exist. Holds the last one tried.
    #[error("Geoid grid not found: {path}")]
    NotFound { path: PathBuf },

    /// IO error on the file that does exist.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is shorter than the smallest possible header.
    #[error("{path}: file too small to be a geoid grid ({size} bytes)")]
    TooSmall { path: PathBuf, size: u64 },

    /// Memory mapping failed.
    #[error("Failed to map {path}: {source}")]
    Map {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file does not start with a `P5` line.
    #[error("{path}: no PGM header")]
    BadMagic { path: PathBuf },

    /// A header line exceeds the maximum header line length.
    #[error("{path} line {line}: line too long in header")]
    LineTooLong { path: PathBuf, line: usize },

    /// End of file reached before a header line was terminated.
    #[error("{path} line {line}: reached EOF before end of line in header")]
    UnterminatedLine { path: PathBuf, line: usize },

    /// A header line could not be parsed.
    #[error("{path} line {line}: expected {expected}")]
    Format {
        path: PathBuf,
        line: usize,
        expected: &'static str,
    },

    /// The depth line is valid but not 65535.
    #[error("{path} line {line}: only PGM files with depth 65535 supported (got {depth})")]
    UnsupportedDepth {
        path: PathBuf,
        line: usize,
        depth: u64,
    },

    /// Payload length does not match the declared dimensions.
    #[error("{path}: expected {expected} bytes after header, have {actual}")]
    SizeMismatch {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// A coordinate handed to one of the GeoJSON helpers is malformed.
    #[error("Invalid coordinate: {message}")]
    InvalidCoordinate { message: String },
}

impl GeoidError {
    /// Returns `true` for the structural header/payload violations.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            GeoidError::TooSmall { .. }
                | GeoidError::BadMagic { .. }
                | GeoidError::LineTooLong { .. }
                | GeoidError::UnterminatedLine { .. }
                | GeoidError::Format { .. }
                | GeoidError::UnsupportedDepth { .. }
                | GeoidError::SizeMismatch { .. }
        )
    }
}

/// Result type alias using [`GeoidError`].
pub type Result<T> = std::result::Result<T, GeoidError>;
