//! Error taxonomy for the synchronization core.
//!
//! Every failure surfaced by this crate is one of the four kinds below.
//! Nothing is retried automatically; the operator re-runs the operation
//! after reading the error.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the core.
pub type Result<T, E = SyncError> = std::result::Result<T, E>;

/// Top-level error surfaced by core operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Required configuration is missing or invalid. Fatal at startup;
    /// also raised for unknown or disabled game identifiers.
    #[error("configuration error: {0}")]
    Config(String),

    /// A save directory does not conform to its game's expected layout.
    /// Aborts the current listing without partial results.
    #[error("malformed save at {path}: {reason}")]
    MalformedSave {
        /// Directory that failed layout validation.
        path: PathBuf,
        /// What was missing or unreadable.
        reason: String,
    },

    /// Packing or unpacking a save archive failed.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// The shared store rejected or failed a request.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Failures while converting between a save directory and a zip archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The directory to pack does not exist.
    #[error("save directory {0} does not exist")]
    MissingSource(PathBuf),

    /// The archive is corrupt or not a recognized zip.
    #[error("unreadable archive {path}: {source}")]
    Format {
        /// Archive being read or written.
        path: PathBuf,
        /// Underlying zip failure.
        #[source]
        source: zip::result::ZipError,
    },

    /// Filesystem failure while reading or writing archive contents.
    #[error("archive I/O failed at {path}: {source}")]
    Io {
        /// File or directory the operation touched.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Failures while talking to the shared HTTP location.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request never completed (DNS, refused connection, hangup).
    #[error("request to {url} failed: {source}")]
    Transport {
        /// URL the request was issued against, kept for manual retry.
        url: String,
        /// Underlying transport failure.
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} answered {status}")]
    Status {
        /// URL the request was issued against.
        url: String,
        /// Status code the server returned.
        status: reqwest::StatusCode,
    },

    /// Local I/O failed while streaming a transfer.
    #[error("transfer I/O failed at {path}: {source}")]
    Io {
        /// Local file being written or read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}
