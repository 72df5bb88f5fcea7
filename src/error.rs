//! Error kinds surfaced by the scanning engine.
//!
//! Every variant that concerns a file names the offending path, so the
//! driver can attribute a failure to one library and keep going with the rest.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot read {}: {source}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot walk {}: {source}", .path.display())]
    DirectoryWalk {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },

    #[error("cannot read archive {}: {source}", .path.display())]
    ArchiveUnreadable {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("not a jmod file: {}", .path.display())]
    InvalidJmod { path: PathBuf },

    #[error("cannot write {}: {source}", .path.display())]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot write report: {0}")]
    ReportWrite(#[source] io::Error),

    #[error("cannot render report: {0}")]
    Render(#[from] serde_json::Error),
}

impl ScanError {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::SourceUnreadable { path, .. }
            | Self::DirectoryWalk { path, .. }
            | Self::ArchiveUnreadable { path, .. }
            | Self::InvalidJmod { path }
            | Self::OutputUnwritable { path, .. } => Some(path),
            Self::ReportWrite(_) | Self::Render(_) => None,
        }
    }
}

/// Invalid invocation: bad paths handed to `-f`, `-d` or `--dot-output`.
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("output directory does not exist: {}", .0.display())]
    MissingOutputDir(PathBuf),
}
