//! Error taxonomy for instance and app operations.

use std::io;
use std::path::PathBuf;

pub type NcsResult<T> = Result<T, NcsError>;

#[derive(Debug, thiserror::Error)]
pub enum NcsError {
    /// An external command exited non-zero or could not be spawned.
    ///
    /// All fields are populated in both cases; `streams` approximates the
    /// interleaved terminal transcript of the two captured streams.
    #[error("command {command:?} failed with return code {return_code}")]
    CommandFailed {
        command: Vec<String>,
        return_code: i32,
        stdout: String,
        stderr: String,
        streams: String,
    },
    #[error("app '{name}' is not installed")]
    AppNotInstalled { name: String },
    #[error("directory {path:?} is not empty")]
    DirectoryNotEmpty { path: PathBuf },
    #[error("Specify either name or URL")]
    InvalidInstallSource,
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("unsupported archive {path:?}: {reason}")]
    UnsupportedArchive { path: PathBuf, reason: String },
    #[error("archive entry '{entry}' escapes the extraction directory")]
    ArchiveEntryEscapes { entry: String },
    #[error("cannot read platform version from {path:?}: {reason}")]
    VersionParse { path: PathBuf, reason: String },
    #[error("cannot decode {context} output: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub(crate) fn io_error(path: impl Into<PathBuf>, err: io::Error) -> NcsError {
    NcsError::Io {
        path: path.into(),
        source: err,
    }
}
